use reqwest::StatusCode;
use shared::error::ErrorResponse;
use thiserror::Error;

/// Everything a `PostApi` call can fail with. The store never surfaces these
/// to users; they are logged and collapsed into one message per operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}")]
    Status {
        status: StatusCode,
        body: Option<ErrorResponse>,
    },
    #[error("response body could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

impl ApiError {
    /// Stable short code carried in diagnostic log lines.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::Status { .. } => "status",
            ApiError::Decode(_) => "decode",
            ApiError::InvalidTimestamp { .. } => "invalid_timestamp",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}
