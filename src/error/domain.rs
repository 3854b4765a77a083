//! Domain-specific error types using `thiserror`.
//!
//! Raw store reads and writes never fail. These errors come from the gallery
//! lifecycle helpers and from snapshot decoding.

use std::result::Result as StdResult;

use {anyhow::Error, serde_json::Error as SerdeJsonError, thiserror::Error};

/// Gallery helper errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GalleryError {
    /// No image with the given id.
    #[error("Image not found: {id}")]
    ImageNotFound { id: i64 },
    /// The image exists but has no comment with the given id.
    #[error("Comment {comment_id} not found on image {image_id}")]
    CommentNotFound { image_id: i64, comment_id: i64 },
    /// An image with the same id is already in the gallery.
    #[error("Duplicate image id: {id}")]
    DuplicateImageId { id: i64 },
    /// The highest id in use is `i64::MAX`, so no new id can be allocated.
    #[error("Id space exhausted in {scope}")]
    IdSpaceExhausted { scope: String },
}

/// Snapshot encoding or decoding errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot JSON could not be produced or parsed.
    #[error("Snapshot serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
}

/// Operational error context propagation with `anyhow`.
pub type Result<T> = StdResult<T, Error>;
