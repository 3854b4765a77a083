//! Reactive gallery store and its image lifecycle helpers.

use {async_channel::Receiver, tracing::warn};

use crate::{
    error::GalleryError,
    gallery::models::{Comment, GalleryImage, next_id},
    store::{Unsubscriber, Writable},
};

/// Ordered sequence of gallery images held in a reactive store.
///
/// `set_images` accepts any sequence as-is. The lifecycle helpers look up
/// images by id, allocate ids, and emit exactly one notification per
/// successful call and none on failure.
#[derive(Debug, Clone)]
pub struct GalleryStore {
    images: Writable<Vec<GalleryImage>>,
}

impl Default for GalleryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryStore {
    /// Creates an empty gallery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            images: Writable::new("gallery", Vec::new()),
        }
    }

    /// Gets a copy of the current image sequence.
    #[must_use]
    pub fn images(&self) -> Vec<GalleryImage> {
        self.images.get()
    }

    /// Replaces the image sequence and notifies subscribers.
    ///
    /// No validation is performed; id uniqueness is the caller's concern.
    pub fn set_images(&self, images: Vec<GalleryImage>) {
        self.images.set(images);
    }

    /// Subscribes to gallery changes, starting with the current sequence.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&Vec<GalleryImage>) + Send + Sync + 'static,
    {
        self.images.subscribe(callback)
    }

    /// Subscribes to gallery changes through a channel, starting with the
    /// current sequence.
    pub fn subscribe_channel(&self) -> Receiver<Vec<GalleryImage>> {
        self.images.subscribe_channel()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Writable<Vec<GalleryImage>> {
        &self.images
    }

    /// Number of images in the gallery.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.with(Vec::len)
    }

    /// Whether the gallery is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets a copy of the image with the given id.
    #[must_use]
    pub fn image(&self, id: i64) -> Option<GalleryImage> {
        self.images
            .with(|images| images.iter().find(|image| image.id == id).cloned())
    }

    /// Uploads a new image at the end of the gallery.
    ///
    /// # Arguments
    ///
    /// * `url` - Image location.
    /// * `name` - Display name.
    ///
    /// # Returns
    ///
    /// The stored image, with an id one past the highest in the gallery.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::IdSpaceExhausted` if an image already has id
    /// `i64::MAX`.
    pub fn add_image(
        &self,
        url: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<GalleryImage, GalleryError> {
        let (url, name) = (url.into(), name.into());
        self.images
            .try_update(|images| {
                let id = next_id(images.iter().map(|image| image.id)).ok_or_else(|| {
                    GalleryError::IdSpaceExhausted {
                        scope: "gallery".to_string(),
                    }
                })?;
                let image = GalleryImage::new(id, url, name);
                images.push(image.clone());
                Ok(image)
            })
            .inspect_err(|e| warn!(error = %e, "Rejected image upload"))
    }

    /// Appends a caller-built image.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::DuplicateImageId` if the id is already used.
    pub fn insert_image(&self, image: GalleryImage) -> Result<(), GalleryError> {
        self.images
            .try_update(|images| {
                if images.iter().any(|existing| existing.id == image.id) {
                    return Err(GalleryError::DuplicateImageId { id: image.id });
                }
                images.push(image);
                Ok(())
            })
            .inspect_err(|e| warn!(error = %e, "Rejected gallery insert"))
    }

    /// Deletes an image from the gallery.
    ///
    /// # Returns
    ///
    /// The removed image.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ImageNotFound` if no image has the id.
    pub fn remove_image(&self, id: i64) -> Result<GalleryImage, GalleryError> {
        self.images
            .try_update(|images| {
                let index = images
                    .iter()
                    .position(|image| image.id == id)
                    .ok_or(GalleryError::ImageNotFound { id })?;
                Ok(images.remove(index))
            })
            .inspect_err(|e| warn!(error = %e, "Rejected image removal"))
    }

    /// Posts a comment at the end of an image's comment list.
    ///
    /// # Arguments
    ///
    /// * `image_id` - Image to comment on.
    /// * `user_name` - Commenting user.
    /// * `text` - Comment body.
    ///
    /// # Returns
    ///
    /// The stored comment.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ImageNotFound` if no image has the id, or
    /// `GalleryError::IdSpaceExhausted` if a comment on it has id `i64::MAX`.
    pub fn add_comment(
        &self,
        image_id: i64,
        user_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Comment, GalleryError> {
        let (user_name, text) = (user_name.into(), text.into());
        self.images
            .try_update(|images| {
                let image = find_mut(images, image_id)?;
                let id = image.next_comment_id().ok_or_else(|| {
                    GalleryError::IdSpaceExhausted {
                        scope: format!("comments of image {image_id}"),
                    }
                })?;
                let comment = Comment::new(id, user_name, text);
                image.comments.push(comment.clone());
                Ok(comment)
            })
            .inspect_err(|e| warn!(error = %e, "Rejected comment"))
    }

    /// Deletes a comment from an image.
    ///
    /// # Returns
    ///
    /// The removed comment.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ImageNotFound` or `GalleryError::CommentNotFound`.
    pub fn remove_comment(&self, image_id: i64, comment_id: i64) -> Result<Comment, GalleryError> {
        self.images
            .try_update(|images| {
                let image = find_mut(images, image_id)?;
                let index = image
                    .comments
                    .iter()
                    .position(|comment| comment.id == comment_id)
                    .ok_or(GalleryError::CommentNotFound {
                        image_id,
                        comment_id,
                    })?;
                Ok(image.comments.remove(index))
            })
            .inspect_err(|e| warn!(error = %e, "Rejected comment removal"))
    }

    /// Likes an image, or removes the like if the user already liked it.
    ///
    /// An absent like list is created on the first like.
    ///
    /// # Returns
    ///
    /// `true` if the user likes the image after the call.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ImageNotFound` if no image has the id.
    pub fn toggle_like(&self, image_id: i64, user_name: &str) -> Result<bool, GalleryError> {
        self.images
            .try_update(|images| {
                let likes = find_mut(images, image_id)?.likes.get_or_insert_with(Vec::new);
                if let Some(index) = likes.iter().position(|name| name == user_name) {
                    likes.remove(index);
                    Ok(false)
                } else {
                    likes.push(user_name.to_string());
                    Ok(true)
                }
            })
            .inspect_err(|e| warn!(error = %e, "Rejected like toggle"))
    }

    /// Number of likes on an image.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ImageNotFound` if no image has the id.
    pub fn like_count(&self, image_id: i64) -> Result<usize, GalleryError> {
        self.images.with(|images| {
            images
                .iter()
                .find(|image| image.id == image_id)
                .map(GalleryImage::like_count)
                .ok_or(GalleryError::ImageNotFound { id: image_id })
        })
    }
}

fn find_mut(images: &mut [GalleryImage], id: i64) -> Result<&mut GalleryImage, GalleryError> {
    images
        .iter_mut()
        .find(|image| image.id == id)
        .ok_or(GalleryError::ImageNotFound { id })
}
