use anyhow::Result;
use notewatch_core::AppConfig;

/// Secrets are reported only as present or absent.
pub(crate) fn run_check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    let summary = serde_json::json!({
        "database_path": config.database_path(),
        "subjects": config.monitor.subjects,
        "poll_interval_secs": config.monitor.poll_interval_secs,
        "error_ceiling": config.monitor.error_ceiling,
        "error_cooldown_secs": config.monitor.error_cooldown_secs,
        "auto_interact": config.monitor.auto_interact,
        "max_concurrent_subjects": config.monitor.max_concurrent_subjects,
        "fallback_comments": config.monitor.fallback_comments.len(),
        "platform_url": config.platform.base_url,
        "cookie_set": !config.platform.cookie.is_empty(),
        "llm_url": config.llm.base_url,
        "llm_model": config.llm.model,
        "llm_api_key_set": !config.llm.api_key.is_empty(),
        "webhook_set": !config.notify.webhook_url.is_empty(),
        "notify_dedup_window_secs": config.notify.dedup_window_secs,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
