//! Reactive value containers with synchronous change notification.
//!
//! A store holds one value, hands out copies of it, and fans every
//! replacement out to its subscribers in the order they subscribed.

pub mod writable;

pub use writable::{Subscriber, Unsubscriber, Writable};
