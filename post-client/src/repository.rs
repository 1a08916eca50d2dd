//! Sync repository: cache-driven views plus one-shot remote refreshes.
//!
//! Views come straight from the cache's live queries. Refreshes fetch from
//! the remote and write through the cache, which re-emits to every view.
//! A failed refresh is returned to its caller only; it never reaches a view
//! and never touches the cache.

use crate::remote::{RemoteError, RemoteSource};
use post_cache::{CacheStore, LiveQuery, StorageError, StorageResult};
use post_types::{Post, PostId};
use std::sync::Arc;
use thiserror::Error;

/// Why a refresh did not update the cache.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The remote call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The fetched posts could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RefreshError {
    /// Check if the remote reported the record as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_not_found())
    }
}

/// Offline-first repository over a shared cache and remote source.
///
/// Cheap to share: wrap it in an `Arc` and hand it to every screen.
pub struct SyncRepository {
    cache: Arc<CacheStore>,
    remote: Arc<dyn RemoteSource>,
}

impl std::fmt::Debug for SyncRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRepository")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SyncRepository {
    /// Wire a repository from its collaborators.
    pub fn new(cache: Arc<CacheStore>, remote: Arc<dyn RemoteSource>) -> Self {
        Self { cache, remote }
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Every cached post, ascending by id, re-emitted after each write.
    pub async fn posts(&self) -> LiveQuery<Vec<Post>> {
        self.cache.observe_all().await
    }

    /// One cached post, re-emitted after each write to it.
    pub async fn post_by_id(&self, id: PostId) -> LiveQuery<Option<Post>> {
        self.cache.observe_by_id(id).await
    }

    /// Fetch every post and write them into the cache.
    ///
    /// Returns the number of posts fetched.
    pub async fn refresh_all(&self) -> Result<usize, RefreshError> {
        let posts = self.remote.fetch_all().await.map_err(|e| {
            tracing::warn!("Refresh of all posts failed: {}", e);
            e
        })?;

        self.cache.upsert_many(&posts).await?;
        tracing::info!("Refreshed {} post(s)", posts.len());
        Ok(posts.len())
    }

    /// Fetch one post and write it into the cache.
    pub async fn refresh_by_id(&self, id: PostId) -> Result<Post, RefreshError> {
        let post = self.remote.fetch_by_id(id).await.map_err(|e| {
            tracing::warn!("Refresh of post {} failed: {}", id, e);
            e
        })?;

        self.cache.upsert_one(&post).await?;
        tracing::info!("Refreshed post {}", id);
        Ok(post)
    }

    /// Remove every cached post.
    pub async fn clear_cache(&self) -> StorageResult<u64> {
        self.cache.clear().await
    }
}
