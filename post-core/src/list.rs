//! List screen state machine.
//!
//! ```text
//!              CacheEmitted(non-empty)
//!   Loading ───────────────────────────► Success { posts, is_offline: false }
//!      │  ▲                                  │        ▲
//!      │  └────── CacheEmitted(empty) ───────┘        │ CacheEmitted
//!      │                                              │
//!      │ RefreshFailed                  RefreshFailed ▼
//!      ▼                               Success { posts, is_offline: true }
//!   Error { CONNECTIVITY_HINT }
//!
//!   any ── CacheFailed ──► Error { storage message }   (terminal)
//! ```

use crate::{describe, CONNECTIVITY_HINT};
use post_types::Post;

/// UI state of the post list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    /// No cached posts yet.
    #[default]
    Loading,
    /// Cached posts are available.
    Success {
        /// Posts ascending by id. Never empty.
        posts: Vec<Post>,
        /// The last refresh failed; `posts` may be stale.
        is_offline: bool,
    },
    /// Nothing can be shown.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// Inputs to the list reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The cache's live query produced a new snapshot.
    CacheEmitted {
        /// Every cached post, ascending by id.
        posts: Vec<Post>,
    },
    /// The cache's live query failed. No further emissions follow.
    CacheFailed {
        /// Error description.
        error: String,
    },
    /// A refresh against the remote source did not succeed.
    RefreshFailed,
}

impl ListState {
    /// Create the initial state.
    pub fn new() -> Self {
        Self::Loading
    }

    /// Process an event and return the next state.
    pub fn on_event(self, event: ListEvent) -> Self {
        match (self, event) {
            (_, ListEvent::CacheEmitted { posts }) if posts.is_empty() => Self::Loading,
            (_, ListEvent::CacheEmitted { posts }) => Self::Success {
                posts,
                is_offline: false,
            },

            (_, ListEvent::CacheFailed { error }) => Self::Error {
                message: describe(error),
            },

            (Self::Success { posts, .. }, ListEvent::RefreshFailed) => Self::Success {
                posts,
                is_offline: true,
            },
            (Self::Loading, ListEvent::RefreshFailed) => Self::Error {
                message: CONNECTIVITY_HINT.to_string(),
            },
            // Keep the more specific message already shown.
            (error @ Self::Error { .. }, ListEvent::RefreshFailed) => error,
        }
    }

    /// Check if the state is still waiting for data.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the shown posts come from a failed refresh.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            Self::Success {
                is_offline: true,
                ..
            }
        )
    }

    /// Posts currently shown, if any.
    pub fn posts(&self) -> Option<&[Post]> {
        match self {
            Self::Success { posts, .. } => Some(posts),
            _ => None,
        }
    }

    /// Check if the state shows something other than the loading indicator.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNKNOWN_ERROR;

    fn post(id: i64) -> Post {
        Post::new(id, 1, format!("title {id}"), format!("body {id}"))
    }

    fn success(ids: &[i64], is_offline: bool) -> ListState {
        ListState::Success {
            posts: ids.iter().copied().map(post).collect(),
            is_offline,
        }
    }

    // ===========================================
    // Cache emissions
    // ===========================================

    #[test]
    fn starts_loading() {
        assert_eq!(ListState::new(), ListState::Loading);
        assert_eq!(ListState::default(), ListState::Loading);
    }

    #[test]
    fn non_empty_emission_becomes_success() {
        let state = ListState::new().on_event(ListEvent::CacheEmitted {
            posts: vec![post(1), post(2)],
        });
        assert_eq!(state, success(&[1, 2], false));
    }

    #[test]
    fn empty_emission_is_loading_never_empty_success() {
        let state = ListState::new().on_event(ListEvent::CacheEmitted { posts: vec![] });
        assert_eq!(state, ListState::Loading);

        let state = success(&[1], true).on_event(ListEvent::CacheEmitted { posts: vec![] });
        assert_eq!(state, ListState::Loading);
    }

    #[test]
    fn emission_clears_staleness() {
        let state = success(&[1], true).on_event(ListEvent::CacheEmitted {
            posts: vec![post(1), post(2)],
        });
        assert_eq!(state, success(&[1, 2], false));
    }

    #[test]
    fn emission_recovers_from_connectivity_error() {
        let state = ListState::Error {
            message: CONNECTIVITY_HINT.into(),
        }
        .on_event(ListEvent::CacheEmitted {
            posts: vec![post(3)],
        });
        assert_eq!(state, success(&[3], false));
    }

    #[test]
    fn cache_failure_is_error_with_message() {
        let state = success(&[1], false).on_event(ListEvent::CacheFailed {
            error: "disk I/O error".into(),
        });
        assert_eq!(
            state,
            ListState::Error {
                message: "disk I/O error".into()
            }
        );
    }

    #[test]
    fn cache_failure_without_description_uses_fallback() {
        let state = ListState::new().on_event(ListEvent::CacheFailed { error: " ".into() });
        assert_eq!(
            state,
            ListState::Error {
                message: UNKNOWN_ERROR.into()
            }
        );
    }

    // ===========================================
    // Refresh failures
    // ===========================================

    #[test]
    fn refresh_failure_with_data_marks_offline() {
        let state = success(&[1], false).on_event(ListEvent::RefreshFailed);
        assert_eq!(state, success(&[1], true));
        assert!(state.is_offline());
    }

    #[test]
    fn repeated_refresh_failures_keep_data_unchanged() {
        let mut state = success(&[1, 2], false);
        for _ in 0..5 {
            state = state.on_event(ListEvent::RefreshFailed);
        }
        assert_eq!(state, success(&[1, 2], true));
    }

    #[test]
    fn refresh_failure_without_data_is_connectivity_error() {
        let state = ListState::new().on_event(ListEvent::RefreshFailed);
        assert_eq!(
            state,
            ListState::Error {
                message: CONNECTIVITY_HINT.into()
            }
        );
        assert!(!state.is_offline());
    }

    #[test]
    fn refresh_failure_keeps_storage_error_message() {
        let state = ListState::Error {
            message: "database is locked".into(),
        }
        .on_event(ListEvent::RefreshFailed);
        assert_eq!(
            state,
            ListState::Error {
                message: "database is locked".into()
            }
        );
    }

    // ===========================================
    // Accessors
    // ===========================================

    #[test]
    fn accessors_reflect_variant() {
        let loading = ListState::new();
        assert!(loading.is_loading());
        assert!(!loading.is_settled());
        assert!(loading.posts().is_none());

        let ok = success(&[4], false);
        assert!(ok.is_settled());
        assert_eq!(ok.posts().map(|p| p.len()), Some(1));
        assert!(!ok.is_offline());
    }
}
