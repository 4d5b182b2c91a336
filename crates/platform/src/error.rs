//! Typed error enum for platform calls.

use thiserror::Error;

/// Failure of any platform operation.
///
/// The monitor treats a failed listing as a fetch failure (counted against
/// the subject's error budget) and a failed detail call as "generation
/// unavailable" for that item.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    /// Envelope came back with `success: false`.
    #[error("platform rejected {operation}: {message}")]
    Rejected { operation: &'static str, message: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing field in response: {0}")]
    MissingField(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl PlatformError {
    /// Whether this error is transient and the call may succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}
