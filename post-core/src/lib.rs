//! # post-core
//!
//! Pure view-state logic for postview (no I/O, instant tests).
//!
//! Each screen use case has a closed set of UI states and a reducer that
//! folds two independent event sources into it:
//!
//! - emissions (or a terminal failure) from the cache's live query
//! - failures of background refreshes against the remote source
//!
//! ## Design Philosophy
//!
//! The reducers are **pure** - `state.on_event(event)` returns the next state
//! and does nothing else. The screen drivers in `post-client` own the state
//! cell, run the cache subscription and the refreshes as separate tasks, and
//! apply every event as a single read-modify-write against the published
//! state.
//!
//! Two rules keep the composition race-free regardless of task ordering:
//! - a cache emission always rebuilds the state and clears staleness
//! - a refresh failure only ever sets staleness, or reports an error when
//!   there is nothing cached to show

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detail;
pub mod list;

pub use detail::{DetailEvent, DetailState};
pub use list::{ListEvent, ListState};

/// Message shown when a refresh fails and there is no cached data.
pub const CONNECTIVITY_HINT: &str = "Check your internet connection";

/// Message used when a failure carries no description.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

fn describe(error: String) -> String {
    if error.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        error
    }
}
