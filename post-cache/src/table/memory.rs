//! In-memory backend for the post cache.
//!
//! Keeps records in a `BTreeMap` keyed by id, so reads come out sorted.
//! Failures can be injected to exercise the storage-error paths.

use super::PostTable;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use post_types::{Post, PostId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory post table.
///
/// Clones share the same records.
#[derive(Debug, Default, Clone)]
pub struct MemoryTable {
    inner: Arc<Mutex<MemoryTableInner>>,
}

#[derive(Debug, Default)]
struct MemoryTableInner {
    posts: BTreeMap<PostId, Post>,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
    reads: usize,
}

impl MemoryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding `posts`.
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let table = Self::new();
        table.lock().posts.extend(posts.into_iter().map(|p| (p.id, p)));
        table
    }

    /// Cause the next read to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        self.lock().fail_next_read = Some(error.to_string());
    }

    /// Cause the next write to fail with the given error.
    pub fn fail_next_write(&self, error: &str) {
        self.lock().fail_next_write = Some(error.to_string());
    }

    /// Number of reads served so far, failed ones included.
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.lock().posts.len()
    }

    /// Check if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTableInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryTableInner {
    fn check_read(&mut self) -> StorageResult<()> {
        self.reads += 1;
        match self.fail_next_read.take() {
            Some(error) => Err(StorageError::Backend(error)),
            None => Ok(()),
        }
    }

    fn check_write(&mut self) -> StorageResult<()> {
        match self.fail_next_write.take() {
            Some(error) => Err(StorageError::Backend(error)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostTable for MemoryTable {
    async fn select_all(&self) -> StorageResult<Vec<Post>> {
        let mut inner = self.lock();
        inner.check_read()?;
        Ok(inner.posts.values().cloned().collect())
    }

    async fn select_by_id(&self, id: PostId) -> StorageResult<Option<Post>> {
        let mut inner = self.lock();
        inner.check_read()?;
        Ok(inner.posts.get(&id).cloned())
    }

    async fn upsert_many(&self, posts: &[Post]) -> StorageResult<()> {
        let mut inner = self.lock();
        inner.check_write()?;
        for post in posts {
            inner.posts.insert(post.id, post.clone());
        }
        Ok(())
    }

    async fn update(&self, post: &Post) -> StorageResult<bool> {
        let mut inner = self.lock();
        inner.check_write()?;
        match inner.posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let mut inner = self.lock();
        inner.check_write()?;
        let count = inner.posts.len() as u64;
        inner.posts.clear();
        Ok(count)
    }
}
