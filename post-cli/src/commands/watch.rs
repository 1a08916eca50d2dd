//! Print every state change until Ctrl-C.

use anyhow::{Context, Result};
use post_client::{PostDetailScreen, PostListScreen, SyncRepository};
use post_types::PostId;
use std::sync::Arc;
use tokio::sync::watch;

use super::{render_detail, render_list};

/// Run the watch command.
pub async fn run(repo: Arc<SyncRepository>, id: Option<PostId>) -> Result<()> {
    match id {
        Some(id) => {
            let screen = PostDetailScreen::start(repo, id);
            follow(screen.subscribe(), render_detail).await
        }
        None => {
            let screen = PostListScreen::start(repo);
            follow(screen.subscribe(), render_list).await
        }
    }
}

async fn follow<S>(mut states: watch::Receiver<S>, render: fn(&S) -> String) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let rendered = render(&states.borrow_and_update());
        println!("{rendered}");

        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::debug!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
