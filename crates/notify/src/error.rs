//! Typed error enum for notification delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    /// Webhook answered with a non-zero `errcode`.
    #[error("webhook rejected message: errcode {errcode}: {errmsg}")]
    Rejected { errcode: i64, errmsg: String },
    #[error("JSON parse error in webhook response: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
