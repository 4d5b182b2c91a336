//! Failures of comment generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to model endpoint failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("model endpoint answered {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("unreadable {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("model returned no choices")]
    EmptyResponse,
    #[error("model returned a blank completion")]
    BlankCompletion,
    #[error("cannot build HTTP client: {0}")]
    ClientInit(String),
    #[error("giving up after retries: {0}")]
    RetriesExhausted(Box<LlmError>),
}

impl LlmError {
    /// Connection failures, rate limiting and gateway errors are retried;
    /// everything else fails the attempt outright.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => *code == 429 || (500..600).contains(code),
            Self::JsonParse { .. }
            | Self::EmptyResponse
            | Self::BlankCompletion
            | Self::ClientInit(_)
            | Self::RetriesExhausted(_) => false,
        }
    }
}
