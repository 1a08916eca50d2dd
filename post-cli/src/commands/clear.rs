//! Remove every cached post.

use anyhow::{Context, Result};
use post_client::SyncRepository;

/// Run the clear command.
pub async fn run(repo: &SyncRepository) -> Result<()> {
    let deleted = repo.clear_cache().await.context("Failed to clear cache")?;
    println!("Cleared {deleted} cached post(s)");
    Ok(())
}
