//! Like, detail, generate and comment for one newly seen item.

use std::sync::Arc;
use std::time::Duration;

use notewatch_core::constants::{DEFAULT_COMMENT_DELAY_SECS, DEFAULT_LIKE_DELAY_SECS};
use notewatch_core::{FallbackComments, InteractionOutcome, Item, MonitorConfig};
use notewatch_llm::TextGenerator;
use notewatch_platform::PlatformClient;

use crate::ServiceError;

/// Reacts to a newly seen item.
///
/// Each step is isolated: a failed like does not stop the comment, and a
/// failed detail fetch or generation falls back to a canned comment.
/// `run` never fails.
pub struct InteractionPipeline {
    platform: Arc<dyn PlatformClient>,
    generator: Arc<dyn TextGenerator>,
    fallback: FallbackComments,
    like_delay: Duration,
    comment_delay: Duration,
    auto_interact: bool,
}

impl InteractionPipeline {
    #[must_use]
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        generator: Arc<dyn TextGenerator>,
        fallback: FallbackComments,
    ) -> Self {
        Self {
            platform,
            generator,
            fallback,
            like_delay: Duration::from_secs(DEFAULT_LIKE_DELAY_SECS),
            comment_delay: Duration::from_secs(DEFAULT_COMMENT_DELAY_SECS),
            auto_interact: true,
        }
    }

    pub fn from_config(
        platform: Arc<dyn PlatformClient>,
        generator: Arc<dyn TextGenerator>,
        config: &MonitorConfig,
    ) -> Result<Self, ServiceError> {
        Ok(Self::new(platform, generator, config.fallback()?)
            .with_delays(config.like_delay(), config.comment_delay())
            .with_auto_interact(config.auto_interact))
    }

    #[must_use]
    pub const fn with_delays(mut self, like_delay: Duration, comment_delay: Duration) -> Self {
        self.like_delay = like_delay;
        self.comment_delay = comment_delay;
        self
    }

    #[must_use]
    pub const fn with_auto_interact(mut self, enabled: bool) -> Self {
        self.auto_interact = enabled;
        self
    }

    #[must_use]
    pub const fn auto_interact(&self) -> bool {
        self.auto_interact
    }

    pub async fn run(&self, item: &Item) -> InteractionOutcome {
        if !self.auto_interact || item.id.trim().is_empty() {
            return InteractionOutcome::default();
        }

        let liked = self.like(item).await;
        let comment_text = self.compose_comment(item).await;
        let commented = !comment_text.is_empty() && self.post_comment(item, &comment_text).await;

        InteractionOutcome { liked, commented, comment_text }
    }

    async fn like(&self, item: &Item) -> bool {
        tokio::time::sleep(self.like_delay).await;
        match self.platform.like(&item.id).await {
            Ok(()) => {
                tracing::info!(item_id = %item.id, "Liked item");
                true
            },
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Like failed");
                false
            },
        }
    }

    /// Generated text, or a fallback entry when detail or generation fails.
    async fn compose_comment(&self, item: &Item) -> String {
        tokio::time::sleep(self.comment_delay).await;

        let detail = match self.platform.detail(&item.id, &item.access_token).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Detail fetch failed, using fallback comment");
                return self.fallback.pick().to_owned();
            },
        };
        let title = if detail.title.trim().is_empty() { &item.title } else { &detail.title };

        match self.generator.generate(title, &detail.prompt_body()).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => {
                tracing::warn!(item_id = %item.id, "Generator returned blank text, using fallback comment");
                self.fallback.pick().to_owned()
            },
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Comment generation failed, using fallback comment");
                self.fallback.pick().to_owned()
            },
        }
    }

    async fn post_comment(&self, item: &Item, text: &str) -> bool {
        match self.platform.comment(&item.id, text).await {
            Ok(()) => {
                tracing::info!(item_id = %item.id, "Commented on item");
                true
            },
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Posting comment failed");
                false
            },
        }
    }
}
