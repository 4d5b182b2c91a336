//! In-process doubles for the monitor's collaborators.

#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use notewatch_core::{Item, ItemDetail, ItemKind, SeenRecord};
use notewatch_llm::{LlmError, TextGenerator};
use notewatch_notify::{Notifier, NotifyError};
use notewatch_platform::{PlatformClient, PlatformError};
use notewatch_storage::{MemoryStore, SeenStore, StorageError};

pub fn item(id: &str, subject_id: &str) -> Item {
    Item::new(id.to_owned(), subject_id.to_owned(), format!("Post {id}"), ItemKind::Image)
        .with_access_token(format!("token-{id}"))
}

pub fn record(id: &str, subject_id: &str) -> SeenRecord {
    item(id, subject_id).to_seen_record()
}

fn rejected(operation: &'static str) -> PlatformError {
    PlatformError::Rejected { operation, message: "scripted failure".to_owned() }
}

/// Scripted platform. Listings are served in order; once the script runs
/// out every call returns an empty list, or an error when `fail_forever`.
#[derive(Default)]
pub struct FakePlatform {
    pub listings: Mutex<VecDeque<Result<Vec<Item>, ()>>>,
    pub fail_forever: bool,
    pub panic_for_subject: Option<&'static str>,
    pub fail_like: bool,
    pub fail_detail: bool,
    pub fail_comment: bool,
    pub list_latency: Duration,
    pub calls: Mutex<Vec<String>>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, items: Vec<Item>) -> Self {
        self.listings.lock().unwrap().push_back(Ok(items));
        self
    }

    pub fn with_list_failure(self) -> Self {
        self.listings.lock().unwrap().push_back(Err(()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with(prefix)).collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn list_items(&self, subject_id: &str) -> Result<Vec<Item>, PlatformError> {
        assert!(self.panic_for_subject != Some(subject_id), "listing exploded for {subject_id}");
        self.record(format!("list:{subject_id}"));

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if !self.list_latency.is_zero() {
            tokio::time::sleep(self.list_latency).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.listings.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(items)) => Ok(items),
            Some(Err(())) => Err(rejected("list")),
            None if self.fail_forever => Err(rejected("list")),
            None => Ok(Vec::new()),
        }
    }

    async fn like(&self, item_id: &str) -> Result<(), PlatformError> {
        self.record(format!("like:{item_id}"));
        if self.fail_like { Err(rejected("like")) } else { Ok(()) }
    }

    async fn detail(&self, item_id: &str, access_token: &str) -> Result<ItemDetail, PlatformError> {
        self.record(format!("detail:{item_id}:{access_token}"));
        if self.fail_detail {
            return Err(rejected("detail"));
        }
        Ok(ItemDetail {
            title: format!("Detail {item_id}"),
            body: "a walk by the sea".to_owned(),
            kind: ItemKind::Video,
        })
    }

    async fn comment(&self, item_id: &str, text: &str) -> Result<(), PlatformError> {
        self.record(format!("comment:{item_id}:{text}"));
        if self.fail_comment { Err(rejected("comment")) } else { Ok(()) }
    }
}

/// Returns `reply`, or fails when it is `None`.
pub struct FakeGenerator {
    reply: Option<String>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self { reply: Some(text.to_owned()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { reply: None, prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, title: &str, body: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push((title.to_owned(), body.to_owned()));
        self.reply.clone().ok_or(LlmError::EmptyResponse)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_owned());
        if self.fail {
            return Err(NotifyError::Rejected { errcode: 45009, errmsg: "rate limited".to_owned() });
        }
        Ok(())
    }
}

/// `MemoryStore` that can be told to fail counts or specific inserts.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_count: AtomicBool,
    pub fail_insert_for: Mutex<Vec<String>>,
    pub inserts: AtomicUsize,
}

#[async_trait]
impl SeenStore for FlakyStore {
    async fn insert_if_absent(&self, record: &SeenRecord) -> Result<bool, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert_for.lock().unwrap().contains(&record.item_id) {
            return Err(StorageError::Poisoned);
        }
        self.inner.insert_if_absent(record).await
    }

    async fn count_for_subject(&self, subject_id: &str) -> Result<u64, StorageError> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(StorageError::Poisoned);
        }
        self.inner.count_for_subject(subject_id).await
    }
}
