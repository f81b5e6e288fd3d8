//! Cache error types for cite-cache.

use thiserror::Error;

/// Errors from cache operations.
///
/// The validator treats every one of these as a miss or a skipped write.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the document file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cached entry could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid state encountered (poisoned lock, bad timestamp, ...).
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
