//! Typed error enum for the storage layer.
//!
//! Every variant means the store could not answer; the monitor skips the
//! affected item or cycle instead of guessing.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL / connection / busy-timeout failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled connection became available.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking worker running the query panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(String),

    /// In-memory store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying next cycle).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) | Self::Join(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
