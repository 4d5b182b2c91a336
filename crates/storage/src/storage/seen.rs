use chrono::{DateTime, Utc};
use notewatch_core::{ItemKind, SeenRecord};
use rusqlite::{OptionalExtension as _, params};

use super::{Storage, get_conn, log_row_error};
use crate::error::StorageError;

const SELECT_COLUMNS: &str = "item_id, subject_id, title, kind, discovered_at";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn row_to_seen_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeenRecord> {
    let kind: String = row.get(3)?;
    let discovered_at: String = row.get(4)?;
    Ok(SeenRecord {
        item_id: row.get(0)?,
        subject_id: row.get(1)?,
        title: row.get(2)?,
        kind: kind.parse::<ItemKind>().map_err(|e| conversion_error(3, e))?,
        discovered_at: DateTime::parse_from_rfc3339(&discovered_at)
            .map_err(|e| conversion_error(4, e))?
            .with_timezone(&Utc),
    })
}

impl Storage {
    /// Insert the record unless its `item_id` is already stored.
    ///
    /// A single `INSERT OR IGNORE`, so concurrent callers on the same id
    /// cannot both observe `true`.
    ///
    /// # Errors
    /// Returns error if the database cannot be reached or the insert fails.
    pub fn insert_if_absent(&self, record: &SeenRecord) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO seen_items (item_id, subject_id, title, kind, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.item_id,
                record.subject_id,
                record.title,
                record.kind.as_str(),
                record.discovered_at.to_rfc3339(),
            ],
        )?;
        Ok(changed == 1)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn count_for_subject(&self, subject_id: &str) -> Result<u64, StorageError> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM seen_items WHERE subject_id = ?1",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// # Errors
    /// Returns error if database query fails or the row is malformed.
    pub fn get_seen(&self, item_id: &str) -> Result<Option<SeenRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM seen_items WHERE item_id = ?1"),
                params![item_id],
                row_to_seen_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Record counts per subject, ordered by subject id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn subject_counts(&self) -> Result<Vec<(String, u64)>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT subject_id, COUNT(*) FROM seen_items GROUP BY subject_id ORDER BY subject_id",
        )?;
        let rows = stmt.query_map([], |row| {
            let subject: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((subject, count as u64))
        })?;
        Ok(rows.filter_map(log_row_error).collect())
    }

    /// Most recently discovered records for a subject, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn recent_for_subject(
        &self,
        subject_id: &str,
        limit: usize,
    ) -> Result<Vec<SeenRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM seen_items WHERE subject_id = ?1
             ORDER BY discovered_at DESC, item_id LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![subject_id, limit as i64], row_to_seen_record)?;
        Ok(rows.filter_map(log_row_error).collect())
    }
}
