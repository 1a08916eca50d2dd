//! Detail screen state machine.
//!
//! Same shape as the list screen, keyed by a single post: "empty" means the
//! cache holds no record for the observed id.

use crate::{describe, CONNECTIVITY_HINT};
use post_types::Post;

/// UI state of a single post's detail view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    /// The post is not cached yet.
    #[default]
    Loading,
    /// The post is cached.
    Success {
        /// The cached post.
        post: Post,
        /// The last refresh failed; `post` may be stale.
        is_offline: bool,
    },
    /// Nothing can be shown.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// Inputs to the detail reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEvent {
    /// The cache's live query produced a new value for the observed id.
    CacheEmitted {
        /// The cached post, `None` when absent.
        post: Option<Post>,
    },
    /// The cache's live query failed. No further emissions follow.
    CacheFailed {
        /// Error description.
        error: String,
    },
    /// A refresh of the observed id did not succeed (including not-found).
    RefreshFailed,
}

impl DetailState {
    /// Create the initial state.
    pub fn new() -> Self {
        Self::Loading
    }

    /// Process an event and return the next state.
    pub fn on_event(self, event: DetailEvent) -> Self {
        match (self, event) {
            (_, DetailEvent::CacheEmitted { post: None }) => Self::Loading,
            (_, DetailEvent::CacheEmitted { post: Some(post) }) => Self::Success {
                post,
                is_offline: false,
            },

            (_, DetailEvent::CacheFailed { error }) => Self::Error {
                message: describe(error),
            },

            (Self::Success { post, .. }, DetailEvent::RefreshFailed) => Self::Success {
                post,
                is_offline: true,
            },
            (Self::Loading, DetailEvent::RefreshFailed) => Self::Error {
                message: CONNECTIVITY_HINT.to_string(),
            },
            (error @ Self::Error { .. }, DetailEvent::RefreshFailed) => error,
        }
    }

    /// Check if the state is still waiting for data.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the shown post comes from a failed refresh.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            Self::Success {
                is_offline: true,
                ..
            }
        )
    }

    /// The post currently shown, if any.
    pub fn post(&self) -> Option<&Post> {
        match self {
            Self::Success { post, .. } => Some(post),
            _ => None,
        }
    }

    /// Check if the state shows something other than the loading indicator.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}
