//! Centralized state management with reactive updates to UI components.
//!
//! The gallery and profile stores live in one `AppState` context instead of
//! process-wide globals.

pub mod app_state;

pub use app_state::{AppState, StateSnapshot};
