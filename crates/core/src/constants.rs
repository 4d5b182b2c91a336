//! Shared constants for notewatch.
//!
//! Defaults that the config layer and the concrete collaborators agree on.

/// Seconds between two polls of the same subject.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Consecutive list failures after which a subject's monitor gives up.
pub const DEFAULT_ERROR_CEILING: u32 = 10;

/// Pause after a failed list call before the failure is counted.
pub const DEFAULT_ERROR_COOLDOWN_SECS: u64 = 60;

/// Courtesy delay before liking a new item.
pub const DEFAULT_LIKE_DELAY_SECS: u64 = 5;

/// Courtesy delay before fetching detail and commenting.
pub const DEFAULT_COMMENT_DELAY_SECS: u64 = 10;

/// Upper bound on subjects monitored at the same time.
pub const DEFAULT_MAX_CONCURRENT_SUBJECTS: usize = 5;

/// Window in which identical notifications are suppressed (30 minutes).
pub const DEFAULT_NOTIFY_DEDUP_WINDOW_SECS: u64 = 1800;

/// Pause after every webhook delivery attempt.
pub const DEFAULT_NOTIFY_SEND_PAUSE_MS: u64 = 1500;

/// `SQLite` connection pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;

/// Title recorded for items the platform returns without one.
pub const UNTITLED: &str = "untitled";

/// Name shown in notifications when the platform omits the author.
pub const UNKNOWN_AUTHOR: &str = "unknown user";

/// Default comments used when text generation is unavailable.
pub const DEFAULT_FALLBACK_COMMENTS: &[&str] = &[
    "Love this!",
    "Really enjoyed this post",
    "I'm here~",
    "Just passing by~",
    "Thanks for sharing",
    "Looking forward to the next one~",
    "Supporting you!",
];
