//! The cache store: a post table plus live-query notification.

use crate::config::CacheConfig;
use crate::error::StorageResult;
use crate::live::{Affected, LiveQuery, Registry, Sink, SubscriptionId};
use crate::table::{MemoryTable, PostTable, SqliteTable};
use post_types::{Post, PostId};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Durable, observable local storage for posts.
///
/// Shared by reference (`Arc<CacheStore>`) between every repository and
/// screen in the process. Writes from any of them are visible to every
/// active live query.
pub struct CacheStore {
    table: Arc<dyn PostTable>,
    registry: Arc<Registry>,
    /// Writers hold it exclusively across commit and notify; subscribers
    /// hold it shared across registration and their initial read. No
    /// subscriber can receive an older snapshot after a newer one.
    gate: RwLock<()>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("subscribers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Create a store over any backend.
    pub fn new(table: impl PostTable + 'static) -> Self {
        Self {
            table: Arc::new(table),
            registry: Arc::new(Registry::default()),
            gate: RwLock::new(()),
        }
    }

    /// Open the SQLite-backed store described by `config`.
    pub async fn open(config: &CacheConfig) -> StorageResult<Self> {
        Ok(Self::new(SqliteTable::from_config(config).await?))
    }

    /// Create a store kept only in memory.
    pub fn memory() -> Self {
        Self::new(MemoryTable::new())
    }

    // ===========================================
    // Live queries
    // ===========================================

    /// Observe every post, ascending by id.
    ///
    /// The current contents are queued before this returns, so an empty store
    /// yields an empty list right away.
    pub async fn observe_all(&self) -> LiveQuery<Vec<Post>> {
        let _shared = self.gate.read().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = self.registry.register(Sink::All(tx.clone()));
        let initial = self.table.select_all().await;
        self.deliver(guard.id(), &tx, initial);
        LiveQuery::new(rx, guard)
    }

    /// Observe a single post; `None` while no record has this id.
    pub async fn observe_by_id(&self, id: PostId) -> LiveQuery<Option<Post>> {
        let _shared = self.gate.read().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = self.registry.register(Sink::ById(id, tx.clone()));
        let initial = self.table.select_by_id(id).await;
        self.deliver(guard.id(), &tx, initial);
        LiveQuery::new(rx, guard)
    }

    /// Number of live queries currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    // ===========================================
    // One-shot reads
    // ===========================================

    /// Read every post once, ascending by id.
    pub async fn snapshot_all(&self) -> StorageResult<Vec<Post>> {
        self.table.select_all().await
    }

    /// Read a single post once.
    pub async fn snapshot_by_id(&self, id: PostId) -> StorageResult<Option<Post>> {
        self.table.select_by_id(id).await
    }

    // ===========================================
    // Writes
    // ===========================================

    /// Insert or replace posts as one atomic batch.
    pub async fn upsert_many(&self, posts: &[Post]) -> StorageResult<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let _exclusive = self.gate.write().await;
        self.table.upsert_many(posts).await?;
        tracing::debug!("Upserted {} post(s)", posts.len());

        let ids = posts.iter().map(|p| p.id).collect();
        self.notify(Affected::Ids(ids)).await;
        Ok(())
    }

    /// Insert or replace a single post.
    pub async fn upsert_one(&self, post: &Post) -> StorageResult<()> {
        self.upsert_many(std::slice::from_ref(post)).await
    }

    /// Replace an existing post; returns `false` if it was not cached.
    pub async fn update(&self, post: &Post) -> StorageResult<bool> {
        let _exclusive = self.gate.write().await;
        let updated = self.table.update(post).await?;
        if updated {
            tracing::debug!("Updated post {}", post.id);
            self.notify(Affected::Ids(vec![post.id])).await;
        }
        Ok(updated)
    }

    /// Remove every cached post.
    pub async fn clear(&self) -> StorageResult<u64> {
        let _exclusive = self.gate.write().await;
        let deleted = self.table.delete_all().await?;
        tracing::info!("Cleared post cache ({} record(s))", deleted);
        self.notify(Affected::Everything).await;
        Ok(deleted)
    }

    /// Re-run the query of every affected subscription and queue the result.
    async fn notify(&self, affected: Affected) {
        for (id, sink) in self.registry.targets(&affected) {
            match sink {
                Sink::All(tx) => {
                    let result = self.table.select_all().await;
                    self.deliver(id, &tx, result);
                }
                Sink::ById(post_id, tx) => {
                    let result = self.table.select_by_id(post_id).await;
                    self.deliver(id, &tx, result);
                }
            }
        }
    }

    /// Queue a result; drop the subscription if it failed or nobody listens.
    fn deliver<T>(
        &self,
        id: SubscriptionId,
        tx: &mpsc::UnboundedSender<StorageResult<T>>,
        result: StorageResult<T>,
    ) {
        let failed = result.is_err();
        if let Err(e) = &result {
            tracing::error!("Live query {} failed: {}", id, e);
        }
        if tx.send(result).is_err() || failed {
            self.registry.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use futures_util::StreamExt;
    use std::time::Duration;

    fn post(id: i64, title: &str) -> Post {
        Post::new(id, 1, title, format!("body {id}"))
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id.value()).collect()
    }

    async fn next<T>(query: &mut LiveQuery<T>) -> StorageResult<T> {
        tokio::time::timeout(Duration::from_secs(1), query.recv())
            .await
            .expect("live query should emit")
            .expect("live query should not end")
    }

    async fn sqlite_store() -> CacheStore {
        CacheStore::new(SqliteTable::in_memory().await.unwrap())
    }

    // ===========================================
    // observe_all
    // ===========================================

    #[tokio::test]
    async fn empty_store_emits_empty_list_immediately() {
        let store = sqlite_store().await;
        let mut all = store.observe_all().await;
        assert!(all.try_recv().unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn observe_all_is_sorted_regardless_of_insert_order() {
        let store = sqlite_store().await;
        let mut all = store.observe_all().await;
        assert!(next(&mut all).await.unwrap().is_empty());

        store
            .upsert_many(&[post(5, "e"), post(2, "b"), post(8, "h"), post(1, "a")])
            .await
            .unwrap();

        assert_eq!(ids(&next(&mut all).await.unwrap()), vec![1, 2, 5, 8]);
    }

    #[tokio::test]
    async fn observe_all_sorts_negative_and_extreme_ids() {
        let stores = [sqlite_store().await, CacheStore::memory()];
        for store in stores {
            let mut all = store.observe_all().await;
            assert!(next(&mut all).await.unwrap().is_empty());

            store
                .upsert_many(&[
                    post(i64::MAX, "max"),
                    post(-3, "negative"),
                    post(0, "zero"),
                    post(42, "answer"),
                    post(i64::MIN, "min"),
                ])
                .await
                .unwrap();

            assert_eq!(
                ids(&next(&mut all).await.unwrap()),
                vec![i64::MIN, -3, 0, 42, i64::MAX]
            );
        }
    }

    #[tokio::test]
    async fn every_write_re_emits_in_order() {
        let store = sqlite_store().await;
        let mut all = store.observe_all().await;
        next(&mut all).await.unwrap();

        store.upsert_one(&post(1, "a")).await.unwrap();
        store.upsert_one(&post(2, "b")).await.unwrap();
        store.upsert_one(&post(1, "A")).await.unwrap();

        // Emissions are queued before each write returns.
        assert_eq!(ids(&all.try_recv().unwrap().unwrap()), vec![1]);
        assert_eq!(ids(&all.try_recv().unwrap().unwrap()), vec![1, 2]);
        let third = all.try_recv().unwrap().unwrap();
        assert_eq!(third[0].title, "A");
        assert!(all.try_recv().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_never_merges() {
        let store = sqlite_store().await;
        store.upsert_one(&post(1, "A")).await.unwrap();
        store.upsert_one(&Post::new(1, 2, "B", "")).await.unwrap();

        let all = store.snapshot_all().await.unwrap();
        assert_eq!(all, vec![Post::new(1, 2, "B", "")]);
    }

    #[tokio::test]
    async fn empty_batch_is_not_a_write() {
        let store = CacheStore::memory();
        let mut all = store.observe_all().await;
        next(&mut all).await.unwrap();

        store.upsert_many(&[]).await.unwrap();
        assert!(all.try_recv().is_none());
    }

    #[tokio::test]
    async fn live_query_is_a_stream() {
        let store = CacheStore::memory();
        let mut all = store.observe_all().await;
        store.upsert_one(&post(3, "c")).await.unwrap();

        let first = all.next().await.unwrap().unwrap();
        let second = all.next().await.unwrap().unwrap();
        assert!(first.is_empty());
        assert_eq!(ids(&second), vec![3]);
    }

    // ===========================================
    // observe_by_id
    // ===========================================

    #[tokio::test]
    async fn observe_by_id_emits_none_when_absent() {
        let store = sqlite_store().await;
        let mut one = store.observe_by_id(PostId::new(999)).await;
        assert_eq!(next(&mut one).await.unwrap(), None);
    }

    #[tokio::test]
    async fn observe_by_id_only_re_emits_for_its_id() {
        let store = sqlite_store().await;
        let mut one = store.observe_by_id(PostId::new(2)).await;
        assert_eq!(next(&mut one).await.unwrap(), None);

        store.upsert_one(&post(1, "other")).await.unwrap();
        assert!(one.try_recv().is_none());

        store
            .upsert_many(&[post(2, "mine"), post(3, "other")])
            .await
            .unwrap();
        assert_eq!(next(&mut one).await.unwrap(), Some(post(2, "mine")));
    }

    #[tokio::test]
    async fn update_notifies_only_when_record_exists() {
        let store = CacheStore::memory();
        let mut one = store.observe_by_id(PostId::new(4)).await;
        next(&mut one).await.unwrap();

        assert!(!store.update(&post(4, "ghost")).await.unwrap());
        assert!(one.try_recv().is_none());

        store.upsert_one(&post(4, "old")).await.unwrap();
        next(&mut one).await.unwrap();
        assert!(store.update(&post(4, "new")).await.unwrap());
        assert_eq!(next(&mut one).await.unwrap(), Some(post(4, "new")));
    }

    #[tokio::test]
    async fn clear_notifies_every_subscriber() {
        let store = sqlite_store().await;
        store
            .upsert_many(&[post(1, "a"), post(2, "b")])
            .await
            .unwrap();

        let mut all = store.observe_all().await;
        let mut one = store.observe_by_id(PostId::new(7)).await;
        next(&mut all).await.unwrap();
        next(&mut one).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(next(&mut all).await.unwrap().is_empty());
        assert_eq!(next(&mut one).await.unwrap(), None);
    }

    // ===========================================
    // Sharing and cancellation
    // ===========================================

    #[tokio::test]
    async fn concurrent_subscribers_see_each_others_writes() {
        let store = Arc::new(sqlite_store().await);
        let mut a = store.observe_all().await;
        let mut b = store.observe_all().await;
        next(&mut a).await.unwrap();
        next(&mut b).await.unwrap();

        let writer = Arc::clone(&store);
        tokio::spawn(async move { writer.upsert_one(&post(1, "from a")).await })
            .await
            .unwrap()
            .unwrap();
        store.upsert_one(&post(2, "from b")).await.unwrap();

        for query in [&mut a, &mut b] {
            assert_eq!(ids(&next(query).await.unwrap()), vec![1]);
            assert_eq!(ids(&next(query).await.unwrap()), vec![1, 2]);
        }
    }

    #[tokio::test]
    async fn single_record_write_reaches_collection_subscriber() {
        let store = CacheStore::memory();
        let mut all = store.observe_all().await;
        next(&mut all).await.unwrap();

        store.upsert_one(&post(9, "detail refresh")).await.unwrap();
        assert_eq!(ids(&next(&mut all).await.unwrap()), vec![9]);
    }

    #[tokio::test]
    async fn dropping_a_query_unregisters_only_that_query() {
        let store = CacheStore::memory();
        let a = store.observe_all().await;
        let mut b = store.observe_all().await;
        assert_eq!(store.subscriber_count(), 2);

        drop(a);
        assert_eq!(store.subscriber_count(), 1);

        next(&mut b).await.unwrap();
        store.upsert_one(&post(1, "a")).await.unwrap();
        assert_eq!(ids(&next(&mut b).await.unwrap()), vec![1]);
    }

    // ===========================================
    // Storage failures
    // ===========================================

    #[tokio::test]
    async fn initial_read_failure_terminates_query() {
        let table = MemoryTable::new();
        let store = CacheStore::new(table.clone());
        table.fail_next_read("disk I/O error");

        let mut all = store.observe_all().await;
        let err = next(&mut all).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
        assert!(all.recv().await.is_none());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn re_query_failure_terminates_only_that_query() {
        let table = MemoryTable::new();
        let store = CacheStore::new(table.clone());
        let mut first = store.observe_all().await;
        let mut second = store.observe_all().await;
        next(&mut first).await.unwrap();
        next(&mut second).await.unwrap();

        // Subscribers are notified in registration order; the first re-read fails.
        table.fail_next_read("disk I/O error");
        store.upsert_one(&post(1, "a")).await.unwrap();

        assert!(next(&mut first).await.is_err());
        assert!(first.recv().await.is_none());
        assert_eq!(ids(&next(&mut second).await.unwrap()), vec![1]);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn failed_write_propagates_and_does_not_notify() {
        let table = MemoryTable::new();
        let store = CacheStore::new(table.clone());
        let mut all = store.observe_all().await;
        next(&mut all).await.unwrap();

        table.fail_next_write("read-only file system");
        assert!(store.upsert_one(&post(1, "a")).await.is_err());
        assert!(all.try_recv().is_none());
        assert!(store.snapshot_all().await.unwrap().is_empty());
    }
}
