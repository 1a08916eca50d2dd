//! Fetch from the remote and update the cache.

use anyhow::{Context, Result};
use post_client::SyncRepository;
use post_types::PostId;

/// Run the refresh command.
pub async fn run(repo: &SyncRepository, id: Option<PostId>) -> Result<()> {
    match id {
        Some(id) => {
            let post = repo
                .refresh_by_id(id)
                .await
                .with_context(|| format!("Refresh of post {id} failed"))?;
            println!("Refreshed post {}: {}", post.id, post.title);
        }
        None => {
            let count = repo.refresh_all().await.context("Refresh failed")?;
            println!("Refreshed {count} post(s)");
        }
    }
    Ok(())
}
