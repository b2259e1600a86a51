use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The JSON body the server attaches to non-2xx responses (Spring default
/// error attributes plus a `details` list on validation failures). Decoded
/// only to enrich diagnostic logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub status: u16,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn summary(&self) -> String {
        match &self.message {
            Some(message) => format!("{} ({}): {}", self.error, self.status, message),
            None => format!("{} ({})", self.error, self.status),
        }
    }
}

/// Write rules for outgoing posts, mirroring the messages the server returns
/// for the same violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is mandatory and cannot be blank")]
    TitleBlank,
    #[error("Title cannot exceed 100 characters")]
    TitleTooLong,
    #[error("Body is mandatory and cannot be blank")]
    BodyBlank,
    #[error("Image url must be 2048 characters or less")]
    ImageUrlTooLong,
    #[error("Image display indices must be sequential and contiguous starting from 0")]
    ImageIndicesNotContiguous,
}
