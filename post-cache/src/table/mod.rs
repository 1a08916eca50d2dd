//! Storage backends for cached posts.
//!
//! A backend is a plain keyed table: one record per post id, upsert
//! semantics, no notion of subscribers. [`CacheStore`](crate::CacheStore)
//! layers live queries on top of any backend.

mod memory;
mod sqlite;

pub use memory::MemoryTable;
pub use sqlite::{SqliteTable, SCHEMA_VERSION};

use crate::error::StorageResult;
use async_trait::async_trait;
use post_types::{Post, PostId};

/// Trait for post storage backends.
#[async_trait]
pub trait PostTable: Send + Sync {
    /// Get every post, ascending by id.
    async fn select_all(&self) -> StorageResult<Vec<Post>>;

    /// Get the post with the given id.
    async fn select_by_id(&self, id: PostId) -> StorageResult<Option<Post>>;

    /// Insert or fully replace each post, keyed by id.
    ///
    /// All-or-nothing: on error no record of the batch is written. Within a
    /// batch a later entry with a repeated id wins.
    async fn upsert_many(&self, posts: &[Post]) -> StorageResult<()>;

    /// Replace an existing post.
    ///
    /// Returns `false` (and writes nothing) if no record has this id.
    async fn update(&self, post: &Post) -> StorageResult<bool>;

    /// Remove every post.
    ///
    /// Returns the number of records deleted.
    async fn delete_all(&self) -> StorageResult<u64>;
}
