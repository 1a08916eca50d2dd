//! # post-client
//!
//! Offline-first access to posts: a remote source, a sync repository over
//! the shared cache, and screen drivers that publish UI state.
//!
//! ## Features
//!
//! - **Cache-driven views**: screens always render what the cache holds
//! - **Decoupled refresh**: remote failures only mark data stale, they never
//!   tear down a view
//! - **Pluggable remote**: JSON over HTTP (`reqwest`) or a scripted mock
//!
//! ## Example
//!
//! ```ignore
//! use post_cache::{CacheConfig, CacheStore};
//! use post_client::{HttpRemoteSource, PostListScreen, RemoteConfig, SyncRepository};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(CacheStore::open(&CacheConfig::default()).await?);
//! let remote = Arc::new(HttpRemoteSource::new(&RemoteConfig::default())?);
//! let repo = Arc::new(SyncRepository::new(cache, remote));
//!
//! let screen = PostListScreen::start(repo);
//! let mut states = screen.subscribe();
//! while states.changed().await.is_ok() {
//!     println!("{:?}", *states.borrow());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod remote;
pub mod repository;
pub mod screen;

pub use config::RemoteConfig;
pub use remote::{HttpRemoteSource, MockRemoteSource, RemoteError, RemoteResult, RemoteSource};
pub use repository::{RefreshError, SyncRepository};
pub use screen::{PostDetailScreen, PostListScreen};
