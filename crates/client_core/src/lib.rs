use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use shared::{
    domain::{Post, PostId},
    protocol::{PostQuery, PostRequest, SortOrder},
};
use tokio::{
    sync::{broadcast, Mutex},
    time::sleep,
};
use tracing::{error, info};

pub mod api;
pub mod debounce;
pub mod error;
pub mod mapper;
pub mod scroll;

pub use api::{ApiConfig, HttpPostApi, PostApi};
pub use debounce::Debouncer;
pub use error::ApiError;
pub use scroll::LoadMoreTrigger;

use crate::mapper::{page_from_response, post_from_response};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load posts. Please try again later.";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create post. Please try again later.";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update post. Please try again later.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete post. Please try again later.";

/// State change notifications for presentation layers. Sent after the
/// corresponding transition; delivery is best-effort.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    PostsChanged,
    LoadingChanged(bool),
    HasMoreChanged(bool),
    ErrorChanged(Option<String>),
}

/// Parameters for `PostStore::fetch`. Every filter is optional and defaulted;
/// call sites build the ones they need and leave the rest.
#[derive(Debug, Clone, Default)]
pub struct FetchParams {
    /// Reset to page 0 and replace the collection instead of appending.
    pub refresh: bool,
    /// Search text; empty strings are treated as absent.
    pub search: Option<String>,
    /// Explicit page override; defaults to the internal cursor.
    pub page: Option<u32>,
    pub has_images: Option<bool>,
    pub created_after: Option<DateTime<Utc>>,
    pub sort: Option<SortOrder>,
    /// Minimum wall-clock duration for the whole operation, so refresh
    /// spinners do not flicker. Failures still wait it out.
    pub min_delay: Option<Duration>,
}

struct StoreState {
    posts: Vec<Post>,
    is_loading: bool,
    has_more: bool,
    error_message: Option<String>,
    page_cursor: u32,
    temp_id_counter: i64,
    fetch_in_flight: bool,
}

impl StoreState {
    fn new() -> Self {
        Self {
            posts: Vec::new(),
            is_loading: false,
            has_more: true,
            error_message: None,
            page_cursor: 0,
            temp_id_counter: -1,
            fetch_in_flight: false,
        }
    }
}

/// The client-side view of the post collection. Every mutation is applied
/// optimistically under the store lock together with its rollback snapshot,
/// then confirmed or rolled back when the network call settles. Failures
/// never escape: they become a rollback plus one user-facing message.
pub struct PostStore {
    api: Arc<dyn PostApi>,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl PostStore {
    pub fn new(api: Arc<dyn PostApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            api,
            inner: Mutex::new(StoreState::new()),
            events,
        })
    }

    /// Builds a store backed by `HttpPostApi` with the given transport
    /// settings.
    pub fn with_config(config: ApiConfig) -> Result<Arc<Self>, ApiError> {
        Ok(Self::new(Arc::new(HttpPostApi::new(config)?)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.inner.lock().await.posts.clone()
    }

    /// True only while a refresh fetch is in flight; load-more fetches do not
    /// toggle it.
    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.is_loading
    }

    pub async fn has_more(&self) -> bool {
        self.inner.lock().await.has_more
    }

    pub async fn error_message(&self) -> Option<String> {
        self.inner.lock().await.error_message.clone()
    }

    /// Dismisses the current failure message, if any.
    pub async fn clear_error(&self) {
        let mut inner = self.inner.lock().await;
        if inner.error_message.take().is_some() {
            self.emit(StoreEvent::ErrorChanged(None));
        }
    }

    /// Loads one page of posts. A fetch already in flight makes this call a
    /// no-op. Refreshing resets the cursor and replaces the collection;
    /// otherwise the page is appended with duplicate ids skipped. The cursor
    /// only advances on success.
    pub async fn fetch(&self, params: FetchParams) {
        let FetchParams {
            refresh,
            search,
            page,
            has_images,
            created_after,
            sort,
            min_delay,
        } = params;

        let requested_page = {
            let mut inner = self.inner.lock().await;
            if inner.fetch_in_flight {
                return;
            }
            inner.fetch_in_flight = true;

            if refresh {
                inner.page_cursor = 0;
                if !inner.is_loading {
                    inner.is_loading = true;
                    self.emit(StoreEvent::LoadingChanged(true));
                }
                if inner.error_message.take().is_some() {
                    self.emit(StoreEvent::ErrorChanged(None));
                }
            }

            page.unwrap_or(inner.page_cursor)
        };

        let query = PostQuery {
            search: search.filter(|search| !search.is_empty()),
            has_images,
            created_after,
            sort,
            page: Some(requested_page),
            size: None,
        };

        let result = match min_delay {
            // Run the call and the delay together so an early failure does
            // not cut the minimum duration short.
            Some(delay) => tokio::join!(self.api.list_posts(&query), sleep(delay)).0,
            None => self.api.list_posts(&query).await,
        };
        let mapped = result.and_then(page_from_response);

        let mut inner = self.inner.lock().await;
        inner.fetch_in_flight = false;

        match mapped {
            Ok(page) => {
                let fetched = page.content.len();
                if refresh {
                    inner.posts = page.content;
                } else {
                    append_unique(&mut inner.posts, page.content);
                }
                self.emit(StoreEvent::PostsChanged);

                inner.page_cursor = requested_page + 1;
                let has_more = inner.page_cursor < page.total_pages;
                if inner.has_more != has_more {
                    inner.has_more = has_more;
                    self.emit(StoreEvent::HasMoreChanged(has_more));
                }
                info!(
                    page = requested_page,
                    fetched,
                    total_pages = page.total_pages,
                    "loaded posts page"
                );
            }
            Err(err) => {
                error!(error = %err, code = err.code(), "failed to load posts");
                inner.error_message = Some(FETCH_FAILED_MESSAGE.to_string());
                self.emit(StoreEvent::ErrorChanged(inner.error_message.clone()));
            }
        }

        if refresh && inner.is_loading {
            inner.is_loading = false;
            self.emit(StoreEvent::LoadingChanged(false));
        }
    }

    /// Creates a post optimistically: a placeholder with a fresh negative id
    /// is prepended immediately and replaced by the server record on success.
    /// On failure the collection is restored to the snapshot captured when
    /// the placeholder went in.
    pub async fn create(&self, request: PostRequest) {
        let (placeholder_id, snapshot) = {
            let mut inner = self.inner.lock().await;
            let placeholder_id = PostId(inner.temp_id_counter);
            inner.temp_id_counter -= 1;

            let snapshot = inner.posts.clone();
            let now = Utc::now();
            inner.posts.insert(
                0,
                Post {
                    id: placeholder_id,
                    title: request.title.clone(),
                    body: request.body.clone(),
                    images: request.images.clone(),
                    time_created: now,
                    time_modified: now,
                },
            );
            self.emit(StoreEvent::PostsChanged);
            if inner.error_message.take().is_some() {
                self.emit(StoreEvent::ErrorChanged(None));
            }
            (placeholder_id, snapshot)
        };

        match self.api.create_post(&request).await.and_then(post_from_response) {
            Ok(confirmed) => {
                let mut inner = self.inner.lock().await;
                if let Some(slot) = inner
                    .posts
                    .iter_mut()
                    .find(|post| post.id == placeholder_id)
                {
                    *slot = confirmed;
                    self.emit(StoreEvent::PostsChanged);
                }
            }
            Err(err) => {
                error!(error = %err, code = err.code(), "failed to create post");
                self.roll_back(snapshot, CREATE_FAILED_MESSAGE).await;
            }
        }
    }

    /// Updates a post optimistically: title, body, and images are replaced in
    /// place and the modified timestamp bumped, then superseded by the server
    /// record on success. A missing id leaves the collection untouched but
    /// the call still goes out.
    pub async fn update(&self, id: PostId, request: PostRequest) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let snapshot = inner.posts.clone();
            if let Some(slot) = inner.posts.iter_mut().find(|post| post.id == id) {
                let updated = Post {
                    id: slot.id,
                    title: request.title.clone(),
                    body: request.body.clone(),
                    images: request.images.clone(),
                    time_created: slot.time_created,
                    time_modified: Utc::now(),
                };
                *slot = updated;
            }
            self.emit(StoreEvent::PostsChanged);
            if inner.error_message.take().is_some() {
                self.emit(StoreEvent::ErrorChanged(None));
            }
            snapshot
        };

        match self.api.update_post(id, &request).await.and_then(post_from_response) {
            Ok(confirmed) => {
                let mut inner = self.inner.lock().await;
                if let Some(slot) = inner.posts.iter_mut().find(|post| post.id == id) {
                    *slot = confirmed;
                    self.emit(StoreEvent::PostsChanged);
                }
            }
            Err(err) => {
                error!(error = %err, code = err.code(), "failed to update post");
                self.roll_back(snapshot, UPDATE_FAILED_MESSAGE).await;
            }
        }
    }

    /// Deletes a post optimistically: it disappears immediately and comes
    /// back only if the server call fails.
    pub async fn delete(&self, id: PostId) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let snapshot = inner.posts.clone();
            inner.posts.retain(|post| post.id != id);
            self.emit(StoreEvent::PostsChanged);
            if inner.error_message.take().is_some() {
                self.emit(StoreEvent::ErrorChanged(None));
            }
            snapshot
        };

        if let Err(err) = self.api.delete_post(id).await {
            error!(error = %err, code = err.code(), "failed to delete post");
            self.roll_back(snapshot, DELETE_FAILED_MESSAGE).await;
        }
    }

    async fn roll_back(&self, snapshot: Vec<Post>, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.posts = snapshot;
        inner.error_message = Some(message.to_string());
        self.emit(StoreEvent::PostsChanged);
        self.emit(StoreEvent::ErrorChanged(inner.error_message.clone()));
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}

/// Appends fetched posts, skipping ids already present. First occurrence
/// wins, so records the store already holds are not replaced by re-fetched
/// copies.
fn append_unique(posts: &mut Vec<Post>, fetched: Vec<Post>) {
    let mut seen: HashSet<PostId> = posts.iter().map(|post| post.id).collect();
    for post in fetched {
        if seen.insert(post.id) {
            posts.push(post);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
