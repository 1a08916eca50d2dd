//! CLI command implementations.

pub mod clear;
pub mod list;
pub mod refresh;
pub mod show;
pub mod watch;

use anyhow::{Context, Result};
use post_cache::CacheStore;
use post_client::{HttpRemoteSource, MockRemoteSource, RemoteSource, SyncRepository};
use post_core::{DetailState, ListState};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;

const STALE_NOTE: &str = "offline, showing cached data";

/// Wire cache, remote source and repository.
///
/// With `offline` the remote is a mock that fails every call.
pub async fn open_repository(
    config: &Config,
    data_dir: &Path,
    offline: bool,
) -> Result<Arc<SyncRepository>> {
    let cache_config = config.cache.clone().resolve_in(data_dir);
    let cache = CacheStore::open(&cache_config).await.with_context(|| {
        format!(
            "Failed to open cache at {}",
            cache_config.database.display()
        )
    })?;

    let remote: Arc<dyn RemoteSource> = if offline {
        Arc::new(MockRemoteSource::offline())
    } else {
        Arc::new(HttpRemoteSource::new(&config.remote).context("Invalid remote configuration")?)
    };

    Ok(Arc::new(SyncRepository::new(Arc::new(cache), remote)))
}

/// Render a list state for the terminal.
pub fn render_list(state: &ListState) -> String {
    match state {
        ListState::Loading => "Loading...\n".to_string(),
        ListState::Success { posts, is_offline } => {
            let mut out = String::new();
            let _ = write!(out, "Posts ({})", posts.len());
            if *is_offline {
                let _ = write!(out, " [{STALE_NOTE}]");
            }
            out.push('\n');
            for post in posts {
                let _ = writeln!(out, "  [{:>3}] {}", post.id.value(), post.title);
            }
            out
        }
        ListState::Error { message } => format!("Error: {message}\n"),
    }
}

/// Render a detail state for the terminal.
pub fn render_detail(state: &DetailState) -> String {
    match state {
        DetailState::Loading => "Loading...\n".to_string(),
        DetailState::Success { post, is_offline } => {
            let mut out = format!("Post {} by author {}", post.id, post.author_id);
            if *is_offline {
                let _ = write!(out, " [{STALE_NOTE}]");
            }
            let _ = write!(out, "\n\n{}\n\n{}\n", post.title, post.body);
            out
        }
        DetailState::Error { message } => format!("Error: {message}\n"),
    }
}
