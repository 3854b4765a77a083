//! Profile of the user running the session.

pub mod models;
pub mod store;

pub use {
    models::{ProfileDefaults, UserProfile},
    store::ProfileStore,
};
