//! Comment generation on top of the chat completion client.

use std::time::Duration;

use async_trait::async_trait;
use notewatch_core::LlmConfig;

use crate::ai_types::{ChatRequest, Message};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

/// Longest post body forwarded to the model.
pub const MAX_BODY_LEN: usize = 2000;

/// Produces comment text for a post.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns non-blank comment text, or an error when none could be produced.
    async fn generate(&self, title: &str, body: &str) -> Result<String, LlmError>;
}

/// `TextGenerator` backed by an OpenAI-compatible chat model.
#[derive(Debug)]
pub struct CommentGenerator {
    client: LlmClient,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl CommentGenerator {
    #[must_use]
    pub fn new(client: LlmClient, system_prompt: String) -> Self {
        Self { client, system_prompt, max_tokens: 150, temperature: 0.7 }
    }

    /// Build the client and generator from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = LlmClient::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_model(config.model.clone());
        Ok(Self::new(client, config.system_prompt.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature))
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, title: &str, body: &str) -> ChatRequest {
        let prompt = format!(
            "Write a comment for the following post:\nTitle: {}\nContent: {}",
            title,
            truncate(body, MAX_BODY_LEN),
        );
        ChatRequest {
            model: self.client.model().to_owned(),
            messages: vec![Message::system(self.system_prompt.clone()), Message::user(prompt)],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl TextGenerator for CommentGenerator {
    async fn generate(&self, title: &str, body: &str) -> Result<String, LlmError> {
        let request = self.build_request(title, body);
        let content = self.client.chat_completion(&request).await?;
        let comment = content.trim();
        if comment.is_empty() {
            return Err(LlmError::BlankCompletion);
        }
        tracing::info!(chars = comment.chars().count(), "Comment generated");
        Ok(comment.to_owned())
    }
}
