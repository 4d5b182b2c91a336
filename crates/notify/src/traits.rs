use async_trait::async_trait;

use crate::error::NotifyError;

/// Delivers text to the operator channel.
///
/// Delivery is best-effort: callers log failures and move on. Identical
/// messages inside the implementation's dedup window are delivered once.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
