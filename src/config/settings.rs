//! User preference management with XDG Base Directory compliance.
//!
//! Settings only seed profile defaults and logging; gallery and profile state
//! are never written to disk.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

use crate::profile::{
    ProfileDefaults,
    models::{DEFAULT_MOOD, DEFAULT_PROFILE_PICTURE, DEFAULT_USER_NAME},
};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable user settings structure with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// User name given to a new profile.
    pub default_user_name: String,
    /// Avatar URL given to a new profile.
    pub default_profile_picture: String,
    /// Mood tags given to a new profile.
    pub default_moods: Vec<String>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_user_name: DEFAULT_USER_NAME.to_string(),
            default_profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            default_moods: vec![DEFAULT_MOOD.to_string()],
            log_filter: "info".to_string(),
        }
    }
}

impl UserSettings {
    /// Profile seed values described by these settings.
    #[must_use]
    pub fn profile_defaults(&self) -> ProfileDefaults {
        ProfileDefaults {
            user_name: self.default_user_name.clone(),
            profile_picture: self.default_profile_picture.clone(),
            moods: self.default_moods.clone(),
        }
    }

    /// Checks that the settings can seed a usable profile.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for a blank user name or avatar URL.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_user_name.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                reason: "default_user_name must not be empty".to_string(),
            });
        }
        if self.default_profile_picture.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                reason: "default_profile_picture must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SettingsManager` or a `SettingsError`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be read, parsed,
    /// or holds invalid values.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            let settings: UserSettings = from_str(&contents)?;
            settings.validate()?;
            settings
        } else {
            debug!("No settings file at {:?}, using defaults", config_path);
            UserSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Validates new settings, applies them and saves them to disk.
    ///
    /// # Arguments
    ///
    /// * `new_settings` - New settings to apply.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` without applying anything if the
    /// settings are invalid, or an IO/serialization error if saving fails.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Path of the settings file under the XDG config directory.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("gallery-state");
    config_dir.push("settings.json");
    config_dir
}

/// Uses `XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}
