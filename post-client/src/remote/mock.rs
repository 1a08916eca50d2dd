//! Mock remote source for testing.
//!
//! Serves a scripted post list, and can be switched offline or told to fail
//! the next call.

use super::{RemoteError, RemoteResult, RemoteSource};
use async_trait::async_trait;
use post_types::{Post, PostId};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Mock remote source for testing.
///
/// Clones share the same script and counters.
#[derive(Debug, Default, Clone)]
pub struct MockRemoteSource {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    posts: Vec<Post>,
    offline: bool,
    fail_next: Option<RemoteError>,
    delay: Option<Duration>,
    fetch_all_calls: usize,
    fetch_by_id_calls: usize,
}

impl MockRemoteSource {
    /// Create a source serving no posts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source serving `posts`, in this order.
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let source = Self::new();
        source.set_posts(posts);
        source
    }

    /// Create a source whose every call fails with a connection error.
    pub fn offline() -> Self {
        let source = Self::new();
        source.set_offline(true);
        source
    }

    /// Replace the served posts.
    pub fn set_posts(&self, posts: impl IntoIterator<Item = Post>) {
        self.lock().posts = posts.into_iter().collect();
    }

    /// Switch connectivity. While offline every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Cause the next call to fail with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().fail_next = Some(error);
    }

    /// Delay every call by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Number of `fetch_all()` calls so far.
    pub fn fetch_all_calls(&self) -> usize {
        self.lock().fetch_all_calls
    }

    /// Number of `fetch_by_id()` calls so far.
    pub fn fetch_by_id_calls(&self) -> usize {
        self.lock().fetch_by_id_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockRemoteInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn pause(&self) {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl MockRemoteInner {
    fn check(&mut self) -> RemoteResult<()> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if self.offline {
            return Err(RemoteError::Connection("network unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn fetch_all(&self) -> RemoteResult<Vec<Post>> {
        self.lock().fetch_all_calls += 1;
        self.pause().await;

        let mut inner = self.lock();
        inner.check()?;
        Ok(inner.posts.clone())
    }

    async fn fetch_by_id(&self, id: PostId) -> RemoteResult<Post> {
        self.lock().fetch_by_id_calls += 1;
        self.pause().await;

        let mut inner = self.lock();
        inner.check()?;
        inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RemoteError::NotFound { id })
    }
}
