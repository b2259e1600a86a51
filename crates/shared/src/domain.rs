use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PostId);
id_newtype!(ImageId);

impl PostId {
    /// Placeholder ids are strictly negative and only ever assigned locally;
    /// server-assigned ids are non-negative.
    pub fn is_placeholder(&self) -> bool {
        self.0 < 0
    }
}

/// A post as the client models it: parsed timestamps, images in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub images: Vec<Image>,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

/// An attached image. `display_index` is dense and zero-based within a post.
/// `uploading` is client-only state and never crosses the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    pub url: String,
    pub display_index: u32,
    #[serde(skip)]
    pub uploading: bool,
}

/// One window over the server's post collection, flattened from the wire
/// envelope by the mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Reassigns display indices to match list positions, closing any gaps left
/// by a removal.
pub fn resequence_display_indices(images: &mut [Image]) {
    for (position, image) in images.iter_mut().enumerate() {
        image.display_index = position as u32;
    }
}

/// Removes the image with the given id and re-sequences the remainder.
/// Returns whether an image was removed.
pub fn remove_image(images: &mut Vec<Image>, id: ImageId) -> bool {
    let before = images.len();
    images.retain(|image| image.id != id);
    let removed = images.len() != before;
    if removed {
        resequence_display_indices(images);
    }
    removed
}

/// Checks that display indices are dense, zero-based, and unique. List order
/// does not matter; indices are sorted before the check.
pub fn validate_display_indices(images: &[Image]) -> Result<(), ValidationError> {
    let mut indices: Vec<u32> = images.iter().map(|image| image.display_index).collect();
    indices.sort_unstable();
    for (position, index) in indices.into_iter().enumerate() {
        if index != position as u32 {
            return Err(ValidationError::ImageIndicesNotContiguous);
        }
    }
    Ok(())
}
