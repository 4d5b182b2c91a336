//! Test utilities and module declarations for storage tests.

use crate::Storage;
use chrono::{Duration, Utc};
use notewatch_core::{ItemKind, SeenRecord};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path, 4).unwrap();
    (storage, temp_dir)
}

pub fn create_test_record(item_id: &str, subject_id: &str) -> SeenRecord {
    SeenRecord {
        item_id: item_id.to_owned(),
        subject_id: subject_id.to_owned(),
        title: format!("Post {item_id}"),
        kind: ItemKind::Image,
        discovered_at: Utc::now(),
    }
}

pub fn create_record_at(item_id: &str, subject_id: &str, minutes_ago: i64) -> SeenRecord {
    SeenRecord {
        discovered_at: Utc::now() - Duration::minutes(minutes_ago),
        ..create_test_record(item_id, subject_id)
    }
}
