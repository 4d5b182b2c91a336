//! Minimal client for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use crate::ai_types::{ChatRequest, ChatResponse};
use crate::error::LlmError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Pause before each attempt; the first attempt goes out immediately.
const ATTEMPT_DELAYS_SECS: [u64; 4] = [0, 1, 2, 4];

pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    completions_url: String,
    model: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("completions_url", &self.completions_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// `base_url` is the API root including any version segment
    /// (e.g. `https://api.openai.com/v1`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        let completions_url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self { client, api_key, completions_url, model: DEFAULT_MODEL.to_owned() })
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Content of the first choice, retrying transient failures
    /// (connection errors, 429, 5xx) on a short fixed schedule.
    pub(crate) async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut last_error = LlmError::EmptyResponse;

        for (attempt, delay_secs) in ATTEMPT_DELAYS_SECS.into_iter().enumerate() {
            if delay_secs > 0 {
                tracing::warn!(attempt, delay_secs, error = %last_error, "Retrying chat completion");
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
            match self.post_once(request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_transient() => last_error = e,
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::RetriesExhausted(Box::new(last_error)))
    }

    async fn post_once(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::HttpStatus { code: status.as_u16(), body });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|source| {
            LlmError::JsonParse {
                context: format!("chat completion response (body: {})", truncate(&body, 200)),
                source,
            }
        })?;
        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Longest prefix of `s` within `max_len` bytes that ends on a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let end = (0..=max_len).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    s.get(..end).unwrap_or_default()
}
