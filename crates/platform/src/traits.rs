use async_trait::async_trait;
use notewatch_core::{Item, ItemDetail};

use crate::error::PlatformError;

/// Operations the monitor needs from the social platform.
///
/// Implementations own timeouts; no call may block indefinitely.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Recent items of a subject, in the order the platform returns them.
    async fn list_items(&self, subject_id: &str) -> Result<Vec<Item>, PlatformError>;

    async fn like(&self, item_id: &str) -> Result<(), PlatformError>;

    /// Full detail of an item. `access_token` is the opaque token from the listing.
    async fn detail(&self, item_id: &str, access_token: &str)
    -> Result<ItemDetail, PlatformError>;

    async fn comment(&self, item_id: &str, text: &str) -> Result<(), PlatformError>;
}
