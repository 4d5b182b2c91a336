use serde::{Deserialize, Serialize};

/// Every platform response is wrapped in this envelope.
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

#[derive(Deserialize)]
pub(crate) struct PostedNotes {
    #[serde(default)]
    pub notes: Vec<NoteCard>,
}

#[derive(Deserialize)]
pub(crate) struct NoteCard {
    pub note_id: Option<String>,
    pub display_title: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub xsec_token: Option<String>,
    pub user: Option<NoteUser>,
}

#[derive(Deserialize)]
pub(crate) struct NoteUser {
    pub nickname: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct FeedRequest<'a> {
    pub source_note_id: &'a str,
    pub image_formats: [&'static str; 3],
    pub extra: FeedExtra,
    pub xsec_source: &'static str,
    pub xsec_token: &'a str,
}

#[derive(Serialize)]
pub(crate) struct FeedExtra {
    pub need_body_topic: &'static str,
}

#[derive(Deserialize)]
pub(crate) struct FeedData {
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

#[derive(Deserialize)]
pub(crate) struct FeedItem {
    pub note_card: FeedNoteCard,
}

#[derive(Deserialize)]
pub(crate) struct FeedNoteCard {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(rename = "type", default)]
    pub note_type: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct LikeRequest<'a> {
    pub note_oid: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CommentRequest<'a> {
    pub note_id: &'a str,
    pub content: &'a str,
    pub at_users: [&'static str; 0],
}
