//! Operator-facing message texts.

use chrono::Local;
use notewatch_core::constants::UNKNOWN_AUTHOR;
use notewatch_core::{InteractionOutcome, Item};

fn now_str() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

const fn status(ok: bool) -> &'static str {
    if ok { "succeeded" } else { "failed" }
}

/// Announcement of a newly seen item. Interaction lines are only included
/// when auto-interact is enabled.
#[must_use]
pub fn item_notice(
    item: &Item,
    outcome: &InteractionOutcome,
    item_url_base: &str,
    auto_interact: bool,
) -> String {
    let author = item.author_nickname.as_deref().unwrap_or(UNKNOWN_AUTHOR);
    let mut lines = vec![
        "New post published".to_owned(),
        format!("User: {author}"),
        format!("Title: {}", item.title),
        format!("Link: {}/{}", item_url_base.trim_end_matches('/'), item.id),
        format!("Type: {}", item.kind),
    ];
    if auto_interact {
        lines.push(format!("Like: {}", status(outcome.liked)));
        lines.push(format!("Comment: {}", status(outcome.commented)));
        if !outcome.comment_text.is_empty() {
            lines.push(format!("Comment text: {}", outcome.comment_text));
        }
    }
    lines.push(format!("Detected at: {}", now_str()));
    lines.join("\n")
}

/// Sent once when a subject's history is recorded without interacting.
#[must_use]
pub fn welcome_notice(subject_name: &str, recorded: usize, unrecorded: usize) -> String {
    let mut text = format!(
        "Monitoring started\n\
         Subject: {subject_name}\n\
         Recorded {recorded} existing posts. Posts already published when monitoring \
         begins are saved without likes or comments."
    );
    if unrecorded > 0 {
        text.push_str(&format!(
            "\n{unrecorded} existing posts could not be saved and will be handled as new posts."
        ));
    }
    text
}

#[must_use]
pub fn escalation_notice(subject_id: &str, failures: u32, last_error: &str) -> String {
    format!(
        "Monitor alert\n\
         Error: fetching posts for subject {subject_id} failed {failures} times in a row, \
         monitoring for this subject has stopped. Last error: {last_error}\n\
         Alert time: {}",
        now_str()
    )
}
