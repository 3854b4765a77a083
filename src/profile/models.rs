//! Display profile of the current user.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::timestamp::{now_iso8601, parse_iso8601};

/// User name of the default profile.
pub const DEFAULT_USER_NAME: &str = "user";

/// Avatar of the default profile.
pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://www.redditstatic.com/avatars/defaults/v2/avatar_default_1.png";

/// Mood tag of the default profile.
pub const DEFAULT_MOOD: &str = "Professional";

/// Seed values for a freshly created profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    /// Initial user name.
    pub user_name: String,
    /// Initial avatar URL.
    pub profile_picture: String,
    /// Initial mood tags.
    pub moods: Vec<String>,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            moods: vec![DEFAULT_MOOD.to_string()],
        }
    }
}

/// The active user's display identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    pub user_name: String,
    /// Avatar URL.
    pub profile_picture: String,
    /// Mood tags in display order.
    pub moods: Vec<String>,
    /// Free-form bio.
    pub about_text: String,
    /// ISO-8601 time the profile was created.
    pub joined_date: String,
}

impl UserProfile {
    /// Creates a profile from `defaults`, joined now.
    ///
    /// # Arguments
    ///
    /// * `defaults` - Seed values.
    ///
    /// # Returns
    ///
    /// A new `UserProfile` with an empty bio.
    pub fn from_defaults(defaults: &ProfileDefaults) -> Self {
        Self {
            user_name: defaults.user_name.clone(),
            profile_picture: defaults.profile_picture.clone(),
            moods: defaults.moods.clone(),
            about_text: String::new(),
            joined_date: now_iso8601(),
        }
    }

    /// Parsed `joined_date`, if it is valid ISO-8601.
    #[must_use]
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.joined_date)
    }

    /// Whether the profile carries `mood`.
    #[must_use]
    pub fn has_mood(&self, mood: &str) -> bool {
        self.moods.iter().any(|existing| existing == mood)
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::from_defaults(&ProfileDefaults::default())
    }
}
