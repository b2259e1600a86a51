use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    domain::{validate_display_indices, Image, PostId},
    error::ValidationError,
};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_IMAGE_URL_CHARS: usize = 2048;

/// The writable subset of a post. Server-owned id and timestamps are never
/// sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub body: String,
    pub images: Vec<Image>,
}

impl PostRequest {
    /// Applies the server's write rules ahead of submission. Form layers call
    /// this; the store does not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::TitleBlank);
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong);
        }
        if self.body.trim().is_empty() {
            return Err(ValidationError::BodyBlank);
        }
        if self
            .images
            .iter()
            .any(|image| image.url.chars().count() > MAX_IMAGE_URL_CHARS)
        {
            return Err(ValidationError::ImageUrlTooLong);
        }
        validate_display_indices(&self.images)
    }
}

/// A post as the server sends it: timestamps are ISO-8601 strings until the
/// mapper parses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub images: Vec<Image>,
    pub time_created: String,
    pub time_modified: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// The paginated collection envelope: content plus nested page metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

/// Collection ordering, serialized in the server's `sort=field,direction`
/// syntax. The server defaults to newest-first when no sort is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "timeCreated,desc",
            SortOrder::OldestFirst => "timeCreated,asc",
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_query_value())
    }
}

/// Query parameters for listing posts. Every filter is independently optional;
/// absent fields are omitted from the request entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "hasImages", skip_serializing_if = "Option::is_none")]
    pub has_images: Option<bool>,
    #[serde(rename = "createdAfter", skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}
