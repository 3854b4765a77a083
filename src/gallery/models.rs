//! Data models for gallery images and their comments.
//!
//! Field names serialize in camelCase so the records round-trip unchanged
//! through JSON produced or consumed by the web front end.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::timestamp::{now_iso8601, parse_iso8601};

/// A comment posted on a gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Id, unique within the parent image's comment list.
    pub id: i64,
    /// Comment body.
    pub text: String,
    /// Name of the commenting user.
    pub user_name: String,
    /// ISO-8601 time the comment was posted.
    pub timestamp: String,
}

impl Comment {
    /// Creates a comment stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `id` - Id within the parent image.
    /// * `user_name` - Commenting user.
    /// * `text` - Comment body.
    ///
    /// # Returns
    ///
    /// A new `Comment`.
    pub fn new(id: i64, user_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            user_name: user_name.into(),
            timestamp: now_iso8601(),
        }
    }

    /// Parsed `timestamp`, if it is valid ISO-8601.
    #[must_use]
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.timestamp)
    }
}

/// An uploaded image with its comments and likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Id, unique within the gallery.
    pub id: i64,
    /// Image location.
    pub url: String,
    /// Display name.
    pub name: String,
    /// ISO-8601 upload time.
    pub timestamp: String,
    /// Comments in display order.
    pub comments: Vec<Comment>,
    /// User names that liked the image.
    ///
    /// `None` means the field was never set and is omitted from JSON, which is
    /// distinct from `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<String>>,
}

impl GalleryImage {
    /// Creates an image stamped with the current time, without comments or likes.
    ///
    /// # Arguments
    ///
    /// * `id` - Id within the gallery.
    /// * `url` - Image location.
    /// * `name` - Display name.
    ///
    /// # Returns
    ///
    /// A new `GalleryImage`.
    pub fn new(id: i64, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            name: name.into(),
            timestamp: now_iso8601(),
            comments: Vec::new(),
            likes: None,
        }
    }

    /// Parsed `timestamp`, if it is valid ISO-8601.
    #[must_use]
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.timestamp)
    }

    /// Number of likes; an absent list counts as zero.
    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.as_ref().map_or(0, Vec::len)
    }

    /// Whether `user_name` appears in the like list.
    #[must_use]
    pub fn is_liked_by(&self, user_name: &str) -> bool {
        self.likes
            .as_ref()
            .is_some_and(|likes| likes.iter().any(|name| name == user_name))
    }

    /// Next free comment id: one past the highest id in use.
    ///
    /// `None` once the highest id is `i64::MAX`.
    #[must_use]
    pub fn next_comment_id(&self) -> Option<i64> {
        next_id(self.comments.iter().map(|comment| comment.id))
    }
}

/// One past the highest of `ids`, or 1 when empty. `None` on overflow.
pub(crate) fn next_id(ids: impl Iterator<Item = i64>) -> Option<i64> {
    ids.max().map_or(Some(1), |id| id.checked_add(1))
}
