use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::PostId,
    error::ErrorResponse,
    protocol::{PageResponse, PostQuery, PostRequest, PostResponse},
};
use tracing::warn;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport settings for `HttpPostApi`. Plain constructor input; there is no
/// config file.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The REST surface the client consumes. `PostStore` talks to this seam so
/// tests can script success and failure without a server.
#[async_trait]
pub trait PostApi: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> Result<PageResponse<PostResponse>, ApiError>;
    async fn create_post(&self, request: &PostRequest) -> Result<PostResponse, ApiError>;
    async fn update_post(&self, id: PostId, request: &PostRequest)
        -> Result<PostResponse, ApiError>;
    async fn delete_post(&self, id: PostId) -> Result<(), ApiError>;
    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError>;
}

pub struct HttpPostApi {
    http: Client,
    base_url: String,
}

impl HttpPostApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostApi for HttpPostApi {
    async fn list_posts(&self, query: &PostQuery) -> Result<PageResponse<PostResponse>, ApiError> {
        let mut query = query.clone();
        query.size = query.size.map(|size| size.clamp(1, 100));
        let response = send_checked(
            self.http
                .get(format!("{}/posts", self.base_url))
                .query(&query),
        )
        .await?;
        decode_json(response).await
    }

    async fn create_post(&self, request: &PostRequest) -> Result<PostResponse, ApiError> {
        let response = send_checked(
            self.http
                .post(format!("{}/posts", self.base_url))
                .json(request),
        )
        .await?;
        decode_json(response).await
    }

    async fn update_post(
        &self,
        id: PostId,
        request: &PostRequest,
    ) -> Result<PostResponse, ApiError> {
        let response = send_checked(
            self.http
                .put(format!("{}/posts/{}", self.base_url, id.0))
                .json(request),
        )
        .await?;
        decode_json(response).await
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ApiError> {
        send_checked(
            self.http
                .delete(format!("{}/posts/{}", self.base_url, id.0)),
        )
        .await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);
        let response = send_checked(
            self.http
                .post(format!("{}/images/upload", self.base_url))
                .multipart(form),
        )
        .await?;
        Ok(response.text().await?)
    }
}

/// Sends a request and turns any non-2xx response into `ApiError::Status`,
/// decoding the server's error body for the log when one is present.
async fn send_checked(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let decoded = serde_json::from_str::<ErrorResponse>(&body).ok();
    match &decoded {
        Some(detail) => {
            warn!(status = %status, detail = %detail.summary(), "server rejected request")
        }
        None => warn!(status = %status, "server rejected request"),
    }
    Err(ApiError::Status {
        status,
        body: decoded,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ApiError::Decode)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
