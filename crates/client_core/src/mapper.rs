//! Wire-to-model conversion. Pure functions: no state, no network access.

use chrono::{DateTime, Utc};
use shared::{
    domain::{Page, Post},
    protocol::{PageResponse, PostResponse},
};

use crate::error::ApiError;

/// Parses a wire post record into the client model, turning its ISO-8601
/// timestamp strings into `DateTime<Utc>` without losing precision.
pub fn post_from_response(response: PostResponse) -> Result<Post, ApiError> {
    Ok(Post {
        id: response.id,
        title: response.title,
        body: response.body,
        images: response.images,
        time_created: parse_timestamp(&response.time_created)?,
        time_modified: parse_timestamp(&response.time_modified)?,
    })
}

/// Flattens the server's nested page envelope into the client's `Page` shape,
/// mapping every contained record.
pub fn page_from_response(response: PageResponse<PostResponse>) -> Result<Page<Post>, ApiError> {
    let content = response
        .content
        .into_iter()
        .map(post_from_response)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page {
        content,
        size: response.page.size,
        number: response.page.number,
        total_elements: response.page.total_elements,
        total_pages: response.page.total_pages,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| ApiError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
