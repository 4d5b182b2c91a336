//! JSON/HTTP `PlatformClient`.
//!
//! Authenticates with the operator's session cookie. Request signing is not
//! performed here; point `base_url` at a gateway that signs when the
//! platform requires it.

use std::time::Duration;

use async_trait::async_trait;
use notewatch_core::constants::UNTITLED;
use notewatch_core::{Item, ItemDetail, ItemKind, PlatformConfig};
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::api_types::{
    CommentRequest, Envelope, FeedData, FeedExtra, FeedRequest, LikeRequest, NoteCard, PostedNotes,
};
use crate::error::PlatformError;
use crate::traits::PlatformClient;

const USER_POSTED_PATH: &str = "/api/sns/web/v1/user_posted";
const FEED_PATH: &str = "/api/sns/web/v1/feed";
const LIKE_PATH: &str = "/api/sns/web/v1/note/like";
const COMMENT_PATH: &str = "/api/sns/web/v1/comment/post";
const PAGE_SIZE: &str = "30";

pub struct HttpPlatformClient {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl std::fmt::Debug for HttpPlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatformClient")
            .field("base_url", &self.base_url)
            .field("cookie", &"***")
            .finish_non_exhaustive()
    }
}

impl HttpPlatformClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: String, cookie: String, timeout: Duration) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned(), cookie })
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, PlatformError> {
        Self::new(
            config.base_url.clone(),
            config.cookie.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, PlatformError> {
        let response = request.header("Cookie", &self.cookie).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PlatformError::HttpStatus { code: status.as_u16(), body });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|source| PlatformError::JsonParse {
                context: format!("{operation} response"),
                source,
            })?;

        if !envelope.success {
            return Err(PlatformError::Rejected {
                operation,
                message: envelope.msg.unwrap_or_else(|| "no message".to_owned()),
            });
        }
        Ok(envelope.data)
    }
}

fn note_to_item(subject_id: &str, note: NoteCard) -> Option<Item> {
    let Some(id) = note.note_id.filter(|id| !id.trim().is_empty()) else {
        tracing::warn!(subject = %subject_id, "Skipping listed note without an id");
        return None;
    };
    let title = note
        .display_title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned());
    let kind = note.note_type.as_deref().map_or(ItemKind::Image, ItemKind::from_platform_tag);
    let mut item = Item::new(id, subject_id.to_owned(), title, kind)
        .with_access_token(note.xsec_token.unwrap_or_default());
    item.author_nickname = note.user.and_then(|u| u.nickname).filter(|n| !n.trim().is_empty());
    Some(item)
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn list_items(&self, subject_id: &str) -> Result<Vec<Item>, PlatformError> {
        let request = self.client.get(self.url(USER_POSTED_PATH)).query(&[
            ("num", PAGE_SIZE),
            ("cursor", ""),
            ("user_id", subject_id),
            ("image_formats", "jpg,webp,avif"),
        ]);
        let data: Option<PostedNotes> = self.send("list", request).await?;
        let notes = data.map(|d| d.notes).unwrap_or_default();
        Ok(notes.into_iter().filter_map(|n| note_to_item(subject_id, n)).collect())
    }

    async fn like(&self, item_id: &str) -> Result<(), PlatformError> {
        let request = self.client.post(self.url(LIKE_PATH)).json(&LikeRequest { note_oid: item_id });
        self.send::<IgnoredAny>("like", request).await?;
        Ok(())
    }

    async fn detail(
        &self,
        item_id: &str,
        access_token: &str,
    ) -> Result<ItemDetail, PlatformError> {
        let payload = FeedRequest {
            source_note_id: item_id,
            image_formats: ["jpg", "webp", "avif"],
            extra: FeedExtra { need_body_topic: "1" },
            xsec_source: "pc_search",
            xsec_token: access_token,
        };
        let request = self.client.post(self.url(FEED_PATH)).json(&payload);
        let data: Option<FeedData> = self.send("detail", request).await?;
        let card = data
            .and_then(|d| d.items.into_iter().next())
            .map(|item| item.note_card)
            .ok_or_else(|| PlatformError::MissingField("data.items[0].note_card".to_owned()))?;

        Ok(ItemDetail {
            title: card.title.unwrap_or_default(),
            body: card.desc.unwrap_or_default(),
            kind: card.note_type.as_deref().map_or(ItemKind::Image, ItemKind::from_platform_tag),
        })
    }

    async fn comment(&self, item_id: &str, text: &str) -> Result<(), PlatformError> {
        let payload = CommentRequest { note_id: item_id, content: text, at_users: [] };
        let request = self.client.post(self.url(COMMENT_PATH)).json(&payload);
        self.send::<IgnoredAny>("comment", request).await?;
        Ok(())
    }
}
