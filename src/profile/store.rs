//! Reactive profile store.

use {async_channel::Receiver, tracing::debug};

use crate::{
    profile::models::{ProfileDefaults, UserProfile},
    store::{Unsubscriber, Writable},
};

/// The current user's profile held in a reactive store.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profile: Writable<UserProfile>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(&ProfileDefaults::default())
    }
}

impl ProfileStore {
    /// Creates a store holding a fresh profile built from `defaults`.
    pub fn new(defaults: &ProfileDefaults) -> Self {
        Self {
            profile: Writable::new("profile", UserProfile::from_defaults(defaults)),
        }
    }

    /// Gets a copy of the current profile.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        self.profile.get()
    }

    /// Replaces the whole profile and notifies subscribers.
    pub fn set_profile(&self, profile: UserProfile) {
        self.profile.set(profile);
    }

    /// Subscribes to profile changes, starting with the current profile.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&UserProfile) + Send + Sync + 'static,
    {
        self.profile.subscribe(callback)
    }

    /// Subscribes to profile changes through a channel, starting with the
    /// current profile.
    pub fn subscribe_channel(&self) -> Receiver<UserProfile> {
        self.profile.subscribe_channel()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Writable<UserProfile> {
        &self.profile
    }

    /// Changes the display name.
    pub fn set_user_name(&self, user_name: impl Into<String>) {
        let user_name = user_name.into();
        self.profile.update(|profile| profile.user_name = user_name);
    }

    /// Changes the avatar URL.
    pub fn set_profile_picture(&self, url: impl Into<String>) {
        let url = url.into();
        self.profile.update(|profile| profile.profile_picture = url);
    }

    /// Changes the bio.
    pub fn set_about_text(&self, about_text: impl Into<String>) {
        let about_text = about_text.into();
        self.profile.update(|profile| profile.about_text = about_text);
    }

    /// Appends a mood tag.
    ///
    /// # Returns
    ///
    /// `false` without notifying if the tag is already present.
    pub fn add_mood(&self, mood: impl Into<String>) -> bool {
        let mood = mood.into();
        if self.profile.with(|profile| profile.has_mood(&mood)) {
            debug!(mood = %mood, "Mood already present");
            return false;
        }
        self.profile.update(|profile| profile.moods.push(mood));
        true
    }

    /// Removes a mood tag.
    ///
    /// # Returns
    ///
    /// `false` without notifying if the tag is absent.
    pub fn remove_mood(&self, mood: &str) -> bool {
        if !self.profile.with(|profile| profile.has_mood(mood)) {
            debug!(mood, "Mood not present");
            return false;
        }
        self.profile
            .update(|profile| profile.moods.retain(|existing| existing != mood));
        true
    }

    /// Replaces the profile with a fresh one built from `defaults`.
    ///
    /// The new profile gets the current time as its join date.
    pub fn reset(&self, defaults: &ProfileDefaults) {
        self.profile.set(UserProfile::from_defaults(defaults));
    }
}
