//! # post-cache
//!
//! Durable local cache of posts with live queries.
//!
//! ## Architecture
//!
//! ```text
//!   observe_all() / observe_by_id()          upsert_many() / update() / clear()
//!              │                                          │
//!        ┌─────┴──────────────────────────────────────────┴─────┐
//!        │                     CacheStore                        │
//!        │   write gate ── commit ── notify matching subscribers │
//!        │  ┌──────────────────────┐   ┌──────────────────────┐  │
//!        │  │ Registry (DashMap)   │   │ PostTable backend    │  │
//!        │  │ one queue per query  │   │ SQLite │ in-memory   │  │
//!        │  └──────────────────────┘   └──────────────────────┘  │
//!        └───────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating call commits to the backend, then re-runs the query of each
//! affected subscription and pushes the result onto that subscription's
//! queue before returning. A [`LiveQuery`] is a `Stream` of those results;
//! dropping it unregisters the subscription.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod live;
pub mod store;
pub mod table;

pub use config::CacheConfig;
pub use error::{StorageError, StorageResult};
pub use live::LiveQuery;
pub use store::CacheStore;
pub use table::{MemoryTable, PostTable, SqliteTable, SCHEMA_VERSION};
