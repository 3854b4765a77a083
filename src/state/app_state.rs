//! Application state context owning the gallery and profile stores.
//!
//! `AppState` is created once per session and handed to consumers by
//! reference or by cloning; every clone points at the same stores.

use {
    serde::{Deserialize, Serialize},
    serde_json::{from_str, to_string_pretty},
    tracing::{debug, info},
};

use crate::{
    config::UserSettings,
    error::SnapshotError,
    gallery::{GalleryImage, GalleryStore},
    profile::{ProfileDefaults, ProfileStore, UserProfile},
};

/// Point-in-time copy of both stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Gallery contents in display order.
    pub images: Vec<GalleryImage>,
    /// Current profile.
    pub profile: UserProfile,
}

/// Central state container.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Uploaded images with their comments and likes.
    pub gallery: GalleryStore,
    /// The current user's profile.
    pub profile: ProfileStore,
}

impl AppState {
    /// Creates an application state with an empty gallery and a profile
    /// seeded from `defaults`.
    pub fn new(defaults: &ProfileDefaults) -> Self {
        Self {
            gallery: GalleryStore::new(),
            profile: ProfileStore::new(defaults),
        }
    }

    /// Creates an application state seeded from user settings.
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self::new(&settings.profile_defaults())
    }

    /// Copies the current contents of both stores.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            images: self.gallery.images(),
            profile: self.profile.profile(),
        }
    }

    /// Replaces both stores with the snapshot contents.
    ///
    /// Each store notifies its subscribers once.
    pub fn restore(&self, snapshot: StateSnapshot) {
        debug!(
            images = snapshot.images.len(),
            user = %snapshot.profile.user_name,
            "Restoring state snapshot"
        );
        self.gallery.set_images(snapshot.images);
        self.profile.set_profile(snapshot.profile);
    }

    /// Serializes a snapshot of both stores to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(to_string_pretty(&self.snapshot())?)
    }

    /// Restores both stores from snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` for malformed input; the stores are left
    /// untouched and nobody is notified.
    pub fn restore_json(&self, json: &str) -> Result<(), SnapshotError> {
        let snapshot: StateSnapshot = from_str(json)?;
        self.restore(snapshot);
        info!("State restored from snapshot");
        Ok(())
    }
}
