//! Gallery State - reactive client state for a photo gallery
//!
//! Shared state for a photo-gallery front end: an ordered gallery of images
//! with comments and likes, and the profile of the current user. Both live in
//! reactive stores that notify subscribers synchronously on every change, and
//! both are owned by a single `AppState` context.

pub mod config;
pub mod error;
pub mod gallery;
pub mod profile;
pub mod state;
pub mod store;
pub mod timestamp;

// Re-export key types for convenience
pub use {
    config::{SettingsManager, UserSettings},
    error::{GalleryError, SnapshotError},
    gallery::{Comment, GalleryImage, GalleryStore},
    profile::{ProfileDefaults, ProfileStore, UserProfile},
    state::{AppState, StateSnapshot},
    store::{Unsubscriber, Writable},
};
