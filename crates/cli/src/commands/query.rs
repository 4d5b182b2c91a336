use anyhow::Result;
use notewatch_core::AppConfig;

use crate::open_storage;

/// Seen counts for every stored subject plus configured subjects with none yet.
pub(crate) fn run_status(config: &AppConfig) -> Result<()> {
    let storage = open_storage(config)?;
    let mut counts = storage.subject_counts()?;
    for subject in &config.monitor.subjects {
        if !counts.iter().any(|(s, _)| s == subject) {
            counts.push((subject.clone(), 0));
        }
    }
    counts.sort();

    let rows: Vec<serde_json::Value> = counts
        .into_iter()
        .map(|(subject, seen)| serde_json::json!({ "subject": subject, "seen": seen }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub(crate) fn run_recent(config: &AppConfig, subject: &str, limit: usize) -> Result<()> {
    let storage = open_storage(config)?;
    let records = storage.recent_for_subject(subject, limit)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
