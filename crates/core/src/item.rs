//! Discovered items and the records derived from them.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of post published by a subject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Image-and-text post (the platform tags these `normal`).
    #[default]
    #[serde(alias = "normal")]
    Image,
    /// Video post
    Video,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Map a raw platform tag. Anything that is not a video is treated as an image post.
    #[must_use]
    pub fn from_platform_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("video") { Self::Video } else { Self::Image }
    }

    /// Human-readable label used when describing the item to the text generator.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match *self {
            Self::Image => "an image",
            Self::Video => "a video",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" | "normal" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(CoreError::InvalidInput(format!("Invalid item kind: {s}"))),
        }
    }
}

/// A post returned by the platform's listing of a subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub kind: ItemKind,
    pub discovered_at: DateTime<Utc>,
    /// Opaque token the platform requires to read the item's detail.
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub author_nickname: Option<String>,
}

impl Item {
    #[must_use]
    pub fn new(id: String, subject_id: String, title: String, kind: ItemKind) -> Self {
        Self {
            id,
            subject_id,
            title,
            kind,
            discovered_at: Utc::now(),
            access_token: String::new(),
            author_nickname: None,
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    #[must_use]
    pub fn with_author_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.author_nickname = Some(nickname.into());
        self
    }

    /// The persisted form of this item.
    #[must_use]
    pub fn to_seen_record(&self) -> SeenRecord {
        SeenRecord {
            item_id: self.id.clone(),
            subject_id: self.subject_id.clone(),
            title: self.title.clone(),
            kind: self.kind,
            discovered_at: self.discovered_at,
        }
    }
}

/// Full detail of an item, fetched right before commenting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    pub title: String,
    pub body: String,
    pub kind: ItemKind,
}

impl ItemDetail {
    /// Body text handed to the generator, prefixed with the post kind.
    #[must_use]
    pub fn prompt_body(&self) -> String {
        format!("This is {} post. {}", self.kind.label(), self.body)
    }
}

/// Append-only record of an item having been observed for a subject.
///
/// `item_id` is unique across all subjects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    pub item_id: String,
    pub subject_id: String,
    pub title: String,
    pub kind: ItemKind,
    pub discovered_at: DateTime<Utc>,
}

/// Result of reacting to one newly seen item. Never persisted.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InteractionOutcome {
    pub liked: bool,
    pub commented: bool,
    /// Generated or fallback text, kept even when posting failed.
    pub comment_text: String,
}
