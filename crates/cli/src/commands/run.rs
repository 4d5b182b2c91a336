use std::sync::Arc;

use anyhow::Result;
use notewatch_core::AppConfig;
use notewatch_llm::CommentGenerator;
use notewatch_notify::WebhookNotifier;
use notewatch_platform::HttpPlatformClient;
use notewatch_service::{
    InteractionPipeline, MonitorContext, MonitorExit, MonitorSupervisor, shutdown_channel,
};

use crate::open_storage;

pub(crate) async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;

    let storage = Arc::new(open_storage(&config)?);
    let platform = Arc::new(HttpPlatformClient::from_config(&config.platform)?);
    let generator = Arc::new(CommentGenerator::from_config(&config.llm)?);
    let notifier = Arc::new(WebhookNotifier::from_config(&config.notify)?);
    tracing::info!(db = %config.database_path().display(), "Seen store opened");

    let pipeline = InteractionPipeline::from_config(platform.clone(), generator, &config.monitor)?;
    let ctx = MonitorContext::new(platform, storage, notifier, Arc::new(pipeline))
        .configured(&config);

    let (trigger, signal) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received, stopping monitors");
                trigger.trigger();
            },
            Err(e) => tracing::warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });

    let supervisor =
        MonitorSupervisor::new(ctx, config.monitor.max_concurrent_subjects, signal);
    let report = supervisor.run(&config.monitor.subjects).await?;

    for exit in &report.exits {
        if let MonitorExit::Escalated { failures, last_error } = &exit.exit {
            tracing::error!(subject = %exit.subject_id, failures, error = %last_error, "Subject escalated");
        }
    }
    let escalated = report.escalated();
    if !escalated.is_empty() {
        anyhow::bail!("monitoring stopped for escalated subjects: {}", escalated.join(", "));
    }
    tracing::info!("All monitors stopped");
    Ok(())
}
