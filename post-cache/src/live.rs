//! Live queries: subscriptions that re-emit after every relevant write.
//!
//! Each subscription owns an unbounded queue. Emissions are never coalesced,
//! so a subscriber sees every snapshot in commit order.

use crate::error::StorageResult;
use dashmap::DashMap;
use futures_util::Stream;
use post_types::{Post, PostId};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Subscription identifier, unique per store.
pub(crate) type SubscriptionId = u64;

/// Where a subscription's results go.
#[derive(Debug, Clone)]
pub(crate) enum Sink {
    /// `observe_all()` subscriber.
    All(mpsc::UnboundedSender<StorageResult<Vec<Post>>>),
    /// `observe_by_id()` subscriber.
    ById(PostId, mpsc::UnboundedSender<StorageResult<Option<Post>>>),
}

/// Records touched by a write.
#[derive(Debug, Clone)]
pub(crate) enum Affected {
    /// Only these ids.
    Ids(Vec<PostId>),
    /// Potentially every record.
    Everything,
}

impl Sink {
    fn matches(&self, affected: &Affected) -> bool {
        match (self, affected) {
            (Sink::All(_), _) => true,
            (Sink::ById(_, _), Affected::Everything) => true,
            (Sink::ById(id, _), Affected::Ids(ids)) => ids.contains(id),
        }
    }
}

/// Active subscriptions of one store.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    next_id: AtomicU64,
    subscribers: DashMap<SubscriptionId, Sink>,
}

impl Registry {
    /// Register a sink. Dropping the returned guard unregisters it.
    pub(crate) fn register(self: &Arc<Self>, sink: Sink) -> SubscriptionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, sink);
        tracing::debug!("Registered live query {} (total: {})", id, self.len());
        SubscriptionGuard {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Remove a subscription. Removing twice is a no-op.
    pub(crate) fn remove(&self, id: SubscriptionId) {
        if self.subscribers.remove(&id).is_some() {
            tracing::debug!("Removed live query {} (remaining: {})", id, self.len());
        }
    }

    /// Subscriptions affected by a write, ordered by registration.
    ///
    /// Returns owned sinks so no map shard stays locked while queries run.
    pub(crate) fn targets(&self, affected: &Affected) -> Vec<(SubscriptionId, Sink)> {
        let mut targets: Vec<(SubscriptionId, Sink)> = self
            .subscribers
            .iter()
            .filter(|entry| entry.value().matches(affected))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        targets.sort_by_key(|(id, _)| *id);
        targets
    }

    /// Number of active subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

/// Unregisters a subscription when dropped.
#[derive(Debug)]
pub(crate) struct SubscriptionGuard {
    id: SubscriptionId,
    registry: Arc<Registry>,
}

impl SubscriptionGuard {
    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// A live query result stream.
///
/// Yields the current result immediately after subscribing, then a fresh
/// result after every write that can affect it. An `Err` item is terminal:
/// the stream ends right after it.
///
/// Dropping the `LiveQuery` cancels the subscription without affecting any
/// other subscriber of the same store.
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: mpsc::UnboundedReceiver<StorageResult<T>>,
    guard: SubscriptionGuard,
}

impl<T> LiveQuery<T> {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<StorageResult<T>>, guard: SubscriptionGuard) -> Self {
        Self { rx, guard }
    }

    /// Receive the next result.
    ///
    /// Returns `None` once the subscription has ended (after a storage
    /// failure, or when the store itself is gone).
    pub async fn recv(&mut self) -> Option<StorageResult<T>> {
        self.rx.recv().await
    }

    /// Take an already queued result without waiting.
    pub fn try_recv(&mut self) -> Option<StorageResult<T>> {
        self.rx.try_recv().ok()
    }

    /// Identifier of this subscription within its store.
    pub fn subscription_id(&self) -> u64 {
        self.guard.id()
    }
}

impl<T> Stream for LiveQuery<T> {
    type Item = StorageResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
