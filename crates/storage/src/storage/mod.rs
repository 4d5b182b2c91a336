//! `SQLite` seen-item store.
//!
//! All methods are synchronous; `sqlite_async` lifts them onto the tokio
//! blocking pool for the async `SeenStore` trait.

// SQLite uses i64 for counts/limits, Rust uses u64/usize
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust u64 conversions are safe within DB row counts"
)]

mod seen;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::StorageError;
use crate::migrations;

pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Pooled handle to the seen-item database. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Drops rows that fail to decode, logging each one.
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    result.map_err(|e| tracing::warn!(error = %e, "Skipping unreadable seen_items row")).ok()
}

/// Monitors write from several pooled connections at once; WAL plus a busy
/// timeout lets them queue instead of failing with `SQLITE_BUSY`.
fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
}

impl Storage {
    /// Open (creating if needed) the database at `db_path` and bring its
    /// schema up to date.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or migrations fail.
    pub fn new(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        migrations::run_migrations(&*pool.get()?)
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        tracing::info!(pool_size, path = %db_path.display(), "Seen store ready");
        Ok(Self { pool })
    }
}
