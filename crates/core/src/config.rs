//! Runtime configuration.
//!
//! Loaded once at startup from an optional JSON file, overridden from
//! `NOTEWATCH_*` environment variables, validated, and then passed by value
//! to every component that needs it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::IndexedRandom as _;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMMENT_DELAY_SECS, DEFAULT_DB_POOL_SIZE, DEFAULT_ERROR_CEILING,
    DEFAULT_ERROR_COOLDOWN_SECS, DEFAULT_FALLBACK_COMMENTS, DEFAULT_LIKE_DELAY_SECS,
    DEFAULT_MAX_CONCURRENT_SUBJECTS, DEFAULT_NOTIFY_DEDUP_WINDOW_SECS,
    DEFAULT_NOTIFY_SEND_PAUSE_MS, DEFAULT_POLL_INTERVAL_SECS,
};
use crate::env_config::{env_parse_with_default, env_string};
use crate::error::{CoreError, Result};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a close friend leaving a comment on someone's post. \
Write one warm, sincere comment that shows you actually read the post. \
Keep it natural and specific, avoid flattery and template phrases, \
match the tone to the post type (image or video), and stay under 100 characters. \
Reply with the comment text only.";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SQLite` file holding seen items. Defaults to the platform data dir.
    pub database_path: Option<PathBuf>,
    pub db_pool_size: Option<u32>,
    pub platform: PlatformConfig,
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub monitor: MonitorConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
    pub cookie: String,
    /// Prefix of the public item link; the item id is appended.
    pub item_url_base: String,
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://edith.xiaohongshu.com".to_owned(),
            cookie: String::new(),
            item_url_base: "https://www.xiaohongshu.com/explore".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url)
            .field("cookie", &"***")
            .field("item_url_base", &self.item_url_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
            max_tokens: 150,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: String,
    /// Identical messages inside this window are delivered once.
    pub dedup_window_secs: u64,
    pub send_pause_ms: u64,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            dedup_window_secs: DEFAULT_NOTIFY_DEDUP_WINDOW_SECS,
            send_pause_ms: DEFAULT_NOTIFY_SEND_PAUSE_MS,
            timeout_secs: 10,
        }
    }
}

impl NotifyConfig {
    #[must_use]
    pub const fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }

    #[must_use]
    pub const fn send_pause(&self) -> Duration {
        Duration::from_millis(self.send_pause_ms)
    }
}

impl fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("webhook_url", &"***")
            .field("dedup_window_secs", &self.dedup_window_secs)
            .field("send_pause_ms", &self.send_pause_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub subjects: Vec<String>,
    pub poll_interval_secs: u64,
    /// Consecutive list failures that end a subject's monitor.
    pub error_ceiling: u32,
    pub error_cooldown_secs: u64,
    pub like_delay_secs: u64,
    pub comment_delay_secs: u64,
    pub auto_interact: bool,
    pub fallback_comments: Vec<String>,
    pub max_concurrent_subjects: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            error_ceiling: DEFAULT_ERROR_CEILING,
            error_cooldown_secs: DEFAULT_ERROR_COOLDOWN_SECS,
            like_delay_secs: DEFAULT_LIKE_DELAY_SECS,
            comment_delay_secs: DEFAULT_COMMENT_DELAY_SECS,
            auto_interact: true,
            fallback_comments: DEFAULT_FALLBACK_COMMENTS.iter().map(|&s| s.to_owned()).collect(),
            max_concurrent_subjects: DEFAULT_MAX_CONCURRENT_SUBJECTS,
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub const fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_secs)
    }

    #[must_use]
    pub const fn like_delay(&self) -> Duration {
        Duration::from_secs(self.like_delay_secs)
    }

    #[must_use]
    pub const fn comment_delay(&self) -> Duration {
        Duration::from_secs(self.comment_delay_secs)
    }

    /// Checks the invariants the monitor relies on.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.subjects.is_empty() {
            return Err(CoreError::InvalidConfig("monitor.subjects must not be empty".to_owned()));
        }
        if self.subjects.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidConfig(
                "monitor.subjects must not contain blank ids".to_owned(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "monitor.poll_interval_secs must be greater than 0".to_owned(),
            ));
        }
        if self.error_ceiling == 0 {
            return Err(CoreError::InvalidConfig(
                "monitor.error_ceiling must be at least 1".to_owned(),
            ));
        }
        if self.max_concurrent_subjects == 0 {
            return Err(CoreError::InvalidConfig(
                "monitor.max_concurrent_subjects must be at least 1".to_owned(),
            ));
        }
        FallbackComments::new(self.fallback_comments.clone())?;
        Ok(())
    }

    /// Validated fallback list.
    ///
    /// # Errors
    /// Returns an error if the configured list is empty or has blank entries.
    pub fn fallback(&self) -> Result<FallbackComments> {
        FallbackComments::new(self.fallback_comments.clone())
    }
}

/// Non-empty list of comments used when text generation is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackComments {
    comments: Vec<String>,
}

impl FallbackComments {
    /// # Errors
    /// Returns `CoreError::InvalidConfig` when the list is empty or contains blank entries.
    pub fn new(comments: Vec<String>) -> Result<Self> {
        if comments.is_empty() {
            return Err(CoreError::InvalidConfig(
                "monitor.fallback_comments must not be empty".to_owned(),
            ));
        }
        if comments.iter().any(|c| c.trim().is_empty()) {
            return Err(CoreError::InvalidConfig(
                "monitor.fallback_comments must not contain blank entries".to_owned(),
            ));
        }
        Ok(Self { comments })
    }

    /// Uniformly random entry. Never empty.
    #[must_use]
    pub fn pick(&self) -> &str {
        self.comments
            .choose(&mut rand::rng())
            .map_or(DEFAULT_FALLBACK_COMMENTS[0], String::as_str)
    }

    #[must_use]
    pub fn contains(&self, comment: &str) -> bool {
        self.comments.iter().any(|c| c == comment)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.comments
    }
}

impl Default for FallbackComments {
    fn default() -> Self {
        Self { comments: DEFAULT_FALLBACK_COMMENTS.iter().map(|&s| s.to_owned()).collect() }
    }
}

impl AppConfig {
    /// Load configuration: JSON file (if given), then environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| CoreError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(subjects) = env_string("NOTEWATCH_SUBJECTS") {
            self.monitor.subjects = subjects
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
        if let Some(v) = env_string("NOTEWATCH_COOKIE") {
            self.platform.cookie = v;
        }
        if let Some(v) = env_string("NOTEWATCH_PLATFORM_URL") {
            self.platform.base_url = v;
        }
        if let Some(v) = env_string("NOTEWATCH_LLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = env_string("NOTEWATCH_LLM_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = env_string("NOTEWATCH_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env_string("NOTEWATCH_WEBHOOK_URL") {
            self.notify.webhook_url = v;
        }
        if let Some(v) = env_string("NOTEWATCH_DB_PATH") {
            self.database_path = Some(PathBuf::from(v));
        }
        self.monitor.poll_interval_secs =
            env_parse_with_default("NOTEWATCH_POLL_INTERVAL_SECS", self.monitor.poll_interval_secs);
        self.monitor.error_ceiling =
            env_parse_with_default("NOTEWATCH_ERROR_CEILING", self.monitor.error_ceiling);
        self.monitor.auto_interact =
            env_parse_with_default("NOTEWATCH_AUTO_INTERACT", self.monitor.auto_interact);
        self.monitor.max_concurrent_subjects = env_parse_with_default(
            "NOTEWATCH_MAX_CONCURRENT",
            self.monitor.max_concurrent_subjects,
        );
    }

    /// Validate everything `run` needs.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.monitor.validate()?;
        if self.notify.webhook_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "notify.webhook_url is required (or NOTEWATCH_WEBHOOK_URL)".to_owned(),
            ));
        }
        if self.platform.base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig("platform.base_url must be set".to_owned()));
        }
        if self.monitor.auto_interact && self.llm.api_key.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "llm.api_key is required when auto_interact is on (or NOTEWATCH_LLM_API_KEY)"
                    .to_owned(),
            ));
        }
        Ok(())
    }

    /// Configured database path, or `<data dir>/notewatch/seen.db`.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("notewatch")
                .join("seen.db")
        })
    }

    #[must_use]
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.monitor.subjects = vec!["u1".to_owned(), "u2".to_owned()];
        config.notify.webhook_url = "https://hooks.example/send?key=abc".to_owned();
        config.llm.api_key = "sk-test".to_owned();
        config
    }

    #[test]
    fn defaults_match_documented_values() {
        let monitor = MonitorConfig::default();
        assert_eq!(monitor.poll_interval(), Duration::from_secs(5));
        assert_eq!(monitor.error_ceiling, 10);
        assert_eq!(monitor.error_cooldown(), Duration::from_secs(60));
        assert_eq!(monitor.like_delay(), Duration::from_secs(5));
        assert_eq!(monitor.comment_delay(), Duration::from_secs(10));
        assert!(monitor.auto_interact);
        assert_eq!(monitor.max_concurrent_subjects, 5);
        assert_eq!(monitor.fallback_comments.len(), 7);
        assert_eq!(NotifyConfig::default().dedup_window(), Duration::from_secs(1800));
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn empty_subjects_rejected() {
        let mut config = valid_config();
        config.monitor.subjects.clear();
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn blank_subject_rejected() {
        let mut config = valid_config();
        config.monitor.subjects.push("  ".to_owned());
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ceiling_and_zero_workers_rejected() {
        let mut config = valid_config();
        config.monitor.error_ceiling = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.monitor.max_concurrent_subjects = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_fallback_list_rejected_at_startup() {
        let mut config = valid_config();
        config.monitor.fallback_comments.clear();
        let err = config.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("fallback_comments"), "unexpected error: {err}");
    }

    #[test]
    fn missing_webhook_rejected() {
        let mut config = valid_config();
        config.notify.webhook_url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn llm_key_only_required_when_interacting() {
        let mut config = valid_config();
        config.llm.api_key.clear();
        assert!(config.validate().is_err());
        config.monitor.auto_interact = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fallback_pick_is_always_a_configured_entry() {
        let fallback = FallbackComments::new(vec!["a".to_owned(), "b".to_owned()]).unwrap();
        for _ in 0..50 {
            let picked = fallback.pick();
            assert!(fallback.contains(picked));
            assert!(!picked.is_empty());
        }
    }

    #[test]
    fn fallback_rejects_blank_entries() {
        assert!(FallbackComments::new(vec!["ok".to_owned(), " ".to_owned()]).is_err());
        assert!(FallbackComments::new(Vec::new()).is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"monitor": {"subjects": ["u1"], "poll_interval_secs": 30}, "notify": {"webhook_url": "https://x"}}"#,
        )
        .unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.monitor.subjects, vec!["u1".to_owned()]);
        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.monitor.error_ceiling, 10);
        assert_eq!(config.llm.max_tokens, 150);
        assert_eq!(config.notify.webhook_url, "https://x");
    }

    #[test]
    fn malformed_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = AppConfig::from_file(&path).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("broken.json"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = valid_config();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("key=abc"));
    }
}
