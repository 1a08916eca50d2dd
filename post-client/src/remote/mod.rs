//! Remote source abstraction for postview.
//!
//! A remote source is the network-side source of truth for posts. Calls are
//! one-shot: no internal retries, bounded by the configured timeouts.
//!
//! # Implementations
//!
//! - [`HttpRemoteSource`] - JSON over HTTP (`GET /posts`, `GET /posts/{id}`)
//! - [`MockRemoteSource`] - scripted responses for tests and offline runs

mod http;
mod mock;

pub use http::HttpRemoteSource;
pub use mock::MockRemoteSource;

use async_trait::async_trait;
use post_types::{Post, PostId};
use thiserror::Error;

/// Remote source errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote has no post with this id.
    #[error("post {id} not found")]
    NotFound {
        /// Requested id.
        id: PostId,
    },

    /// A connect, read or overall timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The remote answered with a non-success status.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
}

impl RemoteError {
    /// Check if the remote reported the record as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a connectivity, timeout, status or decode failure.
    pub fn is_network_failure(&self) -> bool {
        !self.is_not_found()
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Trait for remote post sources.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch every post, in the order the remote returns them.
    async fn fetch_all(&self) -> RemoteResult<Vec<Post>>;

    /// Fetch a single post.
    ///
    /// Fails with [`RemoteError::NotFound`] when the remote has no such post.
    async fn fetch_by_id(&self, id: PostId) -> RemoteResult<Post>;
}
