//! Group-robot webhook delivery.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use notewatch_core::NotifyConfig;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::NotifyError;
use crate::traits::Notifier;

#[derive(Serialize)]
struct TextMessage<'a> {
    msgtype: &'static str,
    text: TextContent<'a>,
    enable_duplicate_check: u8,
    duplicate_check_interval: u64,
}

#[derive(Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct WebhookResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Posts text messages to a robot webhook.
///
/// Besides asking the server to drop duplicates, identical payloads are
/// suppressed locally for `dedup_window`, so a restart loop or a repeated
/// escalation does not flood the channel.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
    dedup_window: Duration,
    send_pause: Duration,
    recent: Mutex<HashMap<String, Instant>>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("webhook_url", &"***")
            .field("dedup_window", &self.dedup_window)
            .field("send_pause", &self.send_pause)
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(webhook_url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url,
            dedup_window: Duration::ZERO,
            send_pause: Duration::ZERO,
            recent: Mutex::new(HashMap::new()),
        })
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        Ok(Self::new(config.webhook_url.clone(), Duration::from_secs(config.timeout_secs))?
            .with_dedup_window(config.dedup_window())
            .with_send_pause(config.send_pause()))
    }

    #[must_use]
    pub const fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Pause after every delivery attempt, to stay under the webhook's rate limit.
    #[must_use]
    pub const fn with_send_pause(mut self, pause: Duration) -> Self {
        self.send_pause = pause;
        self
    }

    /// Returns `false` if `text` was already sent within the window; otherwise
    /// reserves it and returns `true`.
    fn reserve(&self, text: &str) -> bool {
        if self.dedup_window.is_zero() {
            return true;
        }
        let Ok(mut recent) = self.recent.lock() else {
            return true;
        };
        let now = Instant::now();
        recent.retain(|_, sent_at| now.duration_since(*sent_at) < self.dedup_window);
        if recent.contains_key(text) {
            return false;
        }
        recent.insert(text.to_owned(), now);
        true
    }

    fn release(&self, text: &str) {
        if let Ok(mut recent) = self.recent.lock() {
            recent.remove(text);
        }
    }

    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let message = TextMessage {
            msgtype: "text",
            text: TextContent { content: text },
            enable_duplicate_check: 1,
            duplicate_check_interval: self.dedup_window.as_secs(),
        };
        let response = self.client.post(&self.webhook_url).json(&message).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NotifyError::HttpStatus { code: status.as_u16(), body });
        }
        let result: WebhookResponse = serde_json::from_str(&body)?;
        if result.errcode != 0 {
            return Err(NotifyError::Rejected { errcode: result.errcode, errmsg: result.errmsg });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if !self.reserve(text) {
            tracing::debug!("Suppressed duplicate notification inside dedup window");
            return Ok(());
        }

        let result = self.deliver(text).await;
        match &result {
            Ok(()) => tracing::info!("Webhook notification delivered"),
            Err(e) => {
                self.release(text);
                tracing::warn!(error = %e, "Webhook notification failed");
            },
        }

        if !self.send_pause.is_zero() {
            tokio::time::sleep(self.send_pause).await;
        }
        result
    }
}
