//! Operator notifications for notewatch.

pub mod error;
pub mod traits;
mod webhook;

pub use error::NotifyError;
pub use traits::Notifier;
pub use webhook::WebhookNotifier;
