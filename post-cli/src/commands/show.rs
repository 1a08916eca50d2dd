//! Show a single post.

use anyhow::{bail, Result};
use post_client::{PostDetailScreen, SyncRepository};
use post_core::DetailState;
use post_types::PostId;
use std::sync::Arc;

use super::render_detail;

/// Run the show command.
pub async fn run(repo: Arc<SyncRepository>, id: PostId) -> Result<()> {
    let screen = PostDetailScreen::start(repo, id);
    match screen.settled().await {
        DetailState::Error { message } => bail!("post {id}: {message}"),
        DetailState::Loading => println!("Post {id} is not cached"),
        state => print!("{}", render_detail(&state)),
    }
    Ok(())
}
