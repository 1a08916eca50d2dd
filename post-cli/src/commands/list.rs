//! Show every post.

use anyhow::{bail, Result};
use post_client::{PostListScreen, SyncRepository};
use post_core::ListState;
use std::sync::Arc;

use super::render_list;

/// Run the list command.
///
/// Prints the state once the startup refresh is done. An error state is
/// reported as a failure.
pub async fn run(repo: Arc<SyncRepository>) -> Result<()> {
    let screen = PostListScreen::start(repo);

    match screen.settled().await {
        ListState::Error { message } => bail!("{message}"),
        // The refresh succeeded but the remote has no posts.
        ListState::Loading => println!("No posts"),
        state => print!("{}", render_list(&state)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use post_cache::CacheStore;
    use post_client::MockRemoteSource;
    use post_types::Post;

    #[tokio::test]
    async fn offline_without_cache_fails() {
        let repo = Arc::new(SyncRepository::new(
            Arc::new(CacheStore::memory()),
            Arc::new(MockRemoteSource::offline()),
        ));

        let err = run(repo).await.unwrap_err();
        assert_eq!(err.to_string(), post_core::CONNECTIVITY_HINT);
    }

    #[tokio::test]
    async fn remote_posts_are_listed() {
        let remote = MockRemoteSource::with_posts([Post::new(1, 1, "a", "")]);
        let repo = Arc::new(SyncRepository::new(
            Arc::new(CacheStore::memory()),
            Arc::new(remote),
        ));

        assert!(run(Arc::clone(&repo)).await.is_ok());
        assert_eq!(repo.cache().snapshot_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_remote_and_cache_finishes() {
        let repo = Arc::new(SyncRepository::new(
            Arc::new(CacheStore::memory()),
            Arc::new(MockRemoteSource::new()),
        ));

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(2), run(repo))
            .await
            .expect("list should not hang on an empty remote");
        assert!(outcome.is_ok());
    }
}
