//! Error types for post-cache.

use std::path::PathBuf;

/// Storage layer errors.
///
/// Any of these is fatal to the operation that hit it. On a live query it
/// terminates the subscription.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema setup or recreation failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database path error.
    #[error("invalid database path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
    },

    /// Failure reported by a non-SQL backend.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
