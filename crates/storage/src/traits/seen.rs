use async_trait::async_trait;
use notewatch_core::SeenRecord;

use crate::error::StorageError;

/// Append-only set of observed items, keyed by globally unique item id.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Record the item if no record with the same `item_id` exists.
    ///
    /// Returns `true` only for the single caller that actually inserted it,
    /// however many callers race on the same id.
    async fn insert_if_absent(&self, record: &SeenRecord) -> Result<bool, StorageError>;

    /// Number of records held for a subject.
    async fn count_for_subject(&self, subject_id: &str) -> Result<u64, StorageError>;
}
