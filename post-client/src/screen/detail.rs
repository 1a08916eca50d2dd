//! Post detail screen driver.

use super::Driver;
use crate::repository::SyncRepository;
use post_core::DetailState;
use post_types::PostId;
use std::sync::Arc;
use tokio::sync::watch;

/// Drives a [`DetailState`] for one post id.
pub struct PostDetailScreen {
    id: PostId,
    repo: Arc<SyncRepository>,
    driver: Driver<DetailState>,
}

impl PostDetailScreen {
    /// Start the screen for `id`. Must be called within a Tokio runtime.
    pub fn start(repo: Arc<SyncRepository>, id: PostId) -> Self {
        let driver = Driver::new();

        let source = Arc::clone(&repo);
        driver.watch_cache(async move { source.post_by_id(id).await });

        let screen = Self { id, repo, driver };
        screen.refresh();
        screen
    }

    /// Id of the shown post.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Fetch the post again in the background.
    pub fn refresh(&self) {
        let repo = Arc::clone(&self.repo);
        let id = self.id;
        self.driver
            .spawn_refresh(async move { repo.refresh_by_id(id).await });
    }

    /// Current state.
    pub fn state(&self) -> DetailState {
        self.driver.state()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.driver.subscribe()
    }

    /// Wait for in-flight refreshes to finish and their writes to be applied.
    pub async fn settled(&self) -> DetailState {
        self.driver.settled().await
    }
}

impl std::fmt::Debug for PostDetailScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostDetailScreen")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
