//! Error handling using `thiserror` for domain errors and `anyhow` for
//! operational context in the binary.

pub mod domain;

pub use domain::{GalleryError, Result, SnapshotError};
