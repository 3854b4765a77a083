//! Gallery of uploaded images with nested comments and likes.

pub mod models;
pub mod store;

pub use {
    models::{Comment, GalleryImage},
    store::GalleryStore,
};
