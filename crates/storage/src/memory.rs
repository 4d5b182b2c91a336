//! In-memory `SeenStore`, for tests and dry runs without a database file.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use async_trait::async_trait;
use notewatch_core::SeenRecord;

use crate::error::StorageError;
use crate::traits::SeenStore;

/// Mutex-guarded map keyed by item id. The check and the insert happen under
/// one lock acquisition.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, SeenRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-existing history, as if a previous run had recorded it.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = SeenRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.item_id.clone(), r)).collect();
        Self { records: Mutex::new(map) }
    }

    /// # Errors
    /// Returns `StorageError::Poisoned` if a writer panicked while holding the lock.
    pub fn get(&self, item_id: &str) -> Result<Option<SeenRecord>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(item_id).cloned())
    }

    /// # Errors
    /// Returns `StorageError::Poisoned` if a writer panicked while holding the lock.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.records.lock().map_err(|_| StorageError::Poisoned)?.len())
    }

    /// # Errors
    /// Returns `StorageError::Poisoned` if a writer panicked while holding the lock.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn insert_if_absent(&self, record: &SeenRecord) -> Result<bool, StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        match records.entry(record.item_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            },
        }
    }

    async fn count_for_subject(&self, subject_id: &str) -> Result<u64, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.values().filter(|r| r.subject_id == subject_id).count() as u64)
    }
}
