//! Typed error enum for the service layer.
//!
//! Only construction and supervision can fail; everything inside a monitor
//! cycle is recovered where it happens.

use notewatch_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration rejected while wiring components.
    #[error("config: {0}")]
    Config(#[from] CoreError),

    /// A subject monitor task panicked or was aborted.
    #[error("monitor for subject {subject} faulted: {message}")]
    MonitorFault { subject: String, message: String },
}
