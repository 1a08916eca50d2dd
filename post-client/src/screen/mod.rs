//! Screen drivers: one published state cell per screen.
//!
//! A driver runs two kinds of task against its cell:
//!
//! ```text
//!   cache task ── LiveQuery ──► on_cache ─────────┐
//!                                                 ├──► watch::Sender<State>
//!   refresh task(s) ── Err ──► on_refresh_failed ─┘
//! ```
//!
//! Every update is a single `send_modify` (read current, reduce, publish), so
//! the two task kinds never race on the state itself. Tasks hold only a weak
//! handle to the cell and are aborted when the screen is dropped.
//!
//! The cache task also answers flush requests: it applies every result already
//! queued on its live query, then acknowledges.

mod detail;
mod list;

pub use detail::PostDetailScreen;
pub use list::PostListScreen;

use crate::repository::RefreshError;
use post_cache::{LiveQuery, StorageResult};
use post_core::{DetailEvent, DetailState, ListEvent, ListState};
use post_types::Post;
use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// A reducer state a screen driver can publish.
pub(crate) trait ScreenState: Default + Clone + Send + Sync + 'static {
    /// What the screen's live query yields.
    type Item: Send + 'static;

    /// Fold a live-query result into the state.
    fn on_cache(self, result: StorageResult<Self::Item>) -> Self;

    /// Fold a failed refresh into the state.
    fn on_refresh_failed(self) -> Self;
}

impl ScreenState for ListState {
    type Item = Vec<Post>;

    fn on_cache(self, result: StorageResult<Vec<Post>>) -> Self {
        self.on_event(match result {
            Ok(posts) => ListEvent::CacheEmitted { posts },
            Err(e) => ListEvent::CacheFailed {
                error: e.to_string(),
            },
        })
    }

    fn on_refresh_failed(self) -> Self {
        self.on_event(ListEvent::RefreshFailed)
    }
}

impl ScreenState for DetailState {
    type Item = Option<Post>;

    fn on_cache(self, result: StorageResult<Option<Post>>) -> Self {
        self.on_event(match result {
            Ok(post) => DetailEvent::CacheEmitted { post },
            Err(e) => DetailEvent::CacheFailed {
                error: e.to_string(),
            },
        })
    }

    fn on_refresh_failed(self) -> Self {
        self.on_event(DetailEvent::RefreshFailed)
    }
}

/// Cells shared between a driver and its tasks.
struct Shared<S> {
    state: watch::Sender<S>,
    /// Set once the first live-query result has been applied.
    primed: watch::Sender<bool>,
    /// Refreshes still in flight.
    refreshing: watch::Sender<usize>,
}

impl<S: ScreenState> Shared<S> {
    fn apply(&self, reduce: impl FnOnce(S) -> S) {
        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state)));
    }

    /// Apply one live-query result and mark the cell primed.
    fn apply_cache(&self, result: StorageResult<S::Item>) {
        self.apply(|state| state.on_cache(result));
        self.primed.send_replace(true);
    }
}

/// Counts one refresh as in flight until dropped.
///
/// Lives inside the refresh task, so the count also drops when the task
/// panics or is aborted.
struct InFlight<S>(Weak<Shared<S>>);

impl<S> InFlight<S> {
    fn new(shared: &Arc<Shared<S>>) -> Self {
        shared.refreshing.send_modify(|n| *n += 1);
        Self(Arc::downgrade(shared))
    }
}

impl<S> Drop for InFlight<S> {
    fn drop(&mut self) {
        if let Some(shared) = self.0.upgrade() {
            shared.refreshing.send_modify(|n| *n = n.saturating_sub(1));
        }
    }
}

type FlushRequest = oneshot::Sender<()>;

/// Owns one state cell and the tasks that write to it.
pub(crate) struct Driver<S> {
    shared: Arc<Shared<S>>,
    /// Flush requests for the cache task, set by `watch_cache`.
    flush: Mutex<Option<mpsc::UnboundedSender<FlushRequest>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: ScreenState> Driver<S> {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: watch::Sender::new(S::default()),
                primed: watch::Sender::new(false),
                refreshing: watch::Sender::new(0),
            }),
            flush: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe with `query` and fold every result into the state.
    pub(crate) fn watch_cache<Q>(&self, query: Q)
    where
        Q: Future<Output = LiveQuery<S::Item>> + Send + 'static,
    {
        let (flush_tx, mut flush_rx) = mpsc::unbounded_channel::<FlushRequest>();
        *self.flush.lock().unwrap_or_else(|p| p.into_inner()) = Some(flush_tx);

        let weak = Arc::downgrade(&self.shared);
        self.spawn(async move {
            let mut query = query.await;
            loop {
                tokio::select! {
                    biased;
                    result = query.recv() => {
                        let Some(result) = result else {
                            break;
                        };
                        let Some(shared) = weak.upgrade() else {
                            break;
                        };
                        shared.apply_cache(result);
                    }
                    Some(ack) = flush_rx.recv() => {
                        let Some(shared) = weak.upgrade() else {
                            break;
                        };
                        while let Some(result) = query.try_recv() {
                            shared.apply_cache(result);
                        }
                        let _ = ack.send(());
                    }
                }
            }
            tracing::debug!("Live query {} ended", query.subscription_id());
        });
    }

    /// Run `refresh` in the background; a failure marks the state stale.
    ///
    /// The failure is applied only after the first cache result, so a fast
    /// failure cannot be overwritten by the initial snapshot.
    pub(crate) fn spawn_refresh<F, T>(&self, refresh: F)
    where
        F: Future<Output = Result<T, RefreshError>> + Send + 'static,
        T: Send + 'static,
    {
        let in_flight = InFlight::new(&self.shared);
        let weak = Arc::downgrade(&self.shared);
        self.spawn(async move {
            let _in_flight = in_flight;

            if let Err(e) = refresh.await {
                tracing::debug!("Refresh failed, marking screen stale: {}", e);
                let Some(mut primed) = weak.upgrade().map(|s| s.primed.subscribe()) else {
                    return;
                };
                // Err only if the cell is gone.
                if primed.wait_for(|primed| *primed).await.is_err() {
                    return;
                }
                if let Some(shared) = weak.upgrade() {
                    shared.apply(S::on_refresh_failed);
                }
            }
        });
    }

    pub(crate) fn state(&self) -> S {
        self.shared.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.shared.state.subscribe()
    }

    /// Wait until no refresh is in flight and the cache task has applied
    /// everything already written, then return the state.
    ///
    /// The result is `Loading` when the cache is still empty afterwards.
    pub(crate) async fn settled(&self) -> S {
        let mut refreshing = self.shared.refreshing.subscribe();
        // The sender lives in `self`, so this wait cannot fail.
        let _ = refreshing.wait_for(|n| *n == 0).await;

        let flush = self
            .flush
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(flush) = flush {
            let (ack, done) = oneshot::channel();
            // Both fail only once the cache task has ended.
            if flush.send(ack).is_ok() {
                let _ = done.await;
            }
        }

        self.state()
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(tokio::spawn(task));
    }
}

impl<S> Drop for Driver<S> {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|p| p.into_inner());
        for handle in tasks.drain(..) {
            handle.abort();
        }
    }
}
