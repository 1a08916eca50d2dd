//! Post list screen driver.

use super::Driver;
use crate::repository::SyncRepository;
use post_core::ListState;
use std::sync::Arc;
use tokio::sync::watch;

/// Drives a [`ListState`] from the repository.
///
/// Starting the screen subscribes to every cached post and fires one refresh;
/// dropping it cancels both.
pub struct PostListScreen {
    repo: Arc<SyncRepository>,
    driver: Driver<ListState>,
}

impl PostListScreen {
    /// Start the screen. Must be called within a Tokio runtime.
    ///
    /// The state is `Loading` until the first cache result is applied.
    pub fn start(repo: Arc<SyncRepository>) -> Self {
        let driver = Driver::new();

        let source = Arc::clone(&repo);
        driver.watch_cache(async move { source.posts().await });

        let screen = Self { repo, driver };
        screen.refresh();
        screen
    }

    /// Fetch every post again in the background.
    ///
    /// Leaves the current staleness flag alone; only the resulting cache
    /// emission clears it.
    pub fn refresh(&self) {
        let repo = Arc::clone(&self.repo);
        self.driver
            .spawn_refresh(async move { repo.refresh_all().await });
    }

    /// Current state.
    pub fn state(&self) -> ListState {
        self.driver.state()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.driver.subscribe()
    }

    /// Wait for in-flight refreshes to finish and their writes to be applied.
    ///
    /// Still `Loading` when the remote had no posts and nothing was cached.
    pub async fn settled(&self) -> ListState {
        self.driver.settled().await
    }
}

impl std::fmt::Debug for PostListScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostListScreen")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
