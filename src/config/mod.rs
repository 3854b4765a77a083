//! User preferences and their on-disk settings file.

pub mod settings;

pub use settings::{SettingsError, SettingsManager, UserSettings, get_config_path};
