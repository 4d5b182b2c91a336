//! Per-subject poll, detect and react loop.

use std::sync::Arc;
use std::time::Duration;

use notewatch_core::constants::{
    DEFAULT_ERROR_CEILING, DEFAULT_ERROR_COOLDOWN_SECS, DEFAULT_POLL_INTERVAL_SECS,
};
use notewatch_core::{AppConfig, Item};
use notewatch_notify::Notifier;
use notewatch_platform::PlatformClient;
use notewatch_storage::SeenStore;
use tokio::sync::Mutex;

use crate::budget::ErrorBudget;
use crate::notice::{escalation_notice, item_notice, welcome_notice};
use crate::pipeline::InteractionPipeline;
use crate::shutdown::ShutdownSignal;

/// Collaborators and timing shared by every subject monitor.
#[derive(Clone)]
pub struct MonitorContext {
    platform: Arc<dyn PlatformClient>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
    pipeline: Arc<InteractionPipeline>,
    /// Serialises the first-run decision (count plus bulk insert) across subjects.
    store_gate: Arc<Mutex<()>>,
    poll_interval: Duration,
    error_cooldown: Duration,
    error_ceiling: u32,
    item_url_base: String,
}

impl MonitorContext {
    #[must_use]
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
        pipeline: Arc<InteractionPipeline>,
    ) -> Self {
        Self {
            platform,
            store,
            notifier,
            pipeline,
            store_gate: Arc::new(Mutex::new(())),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            error_cooldown: Duration::from_secs(DEFAULT_ERROR_COOLDOWN_SECS),
            error_ceiling: DEFAULT_ERROR_CEILING,
            item_url_base: String::new(),
        }
    }

    /// Timing, ceiling and link base taken from the loaded configuration.
    #[must_use]
    pub fn configured(self, config: &AppConfig) -> Self {
        self.with_timing(config.monitor.poll_interval(), config.monitor.error_cooldown())
            .with_error_ceiling(config.monitor.error_ceiling)
            .with_item_url_base(config.platform.item_url_base.clone())
    }

    #[must_use]
    pub const fn with_timing(mut self, poll_interval: Duration, error_cooldown: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.error_cooldown = error_cooldown;
        self
    }

    #[must_use]
    pub const fn with_error_ceiling(mut self, ceiling: u32) -> Self {
        self.error_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn with_item_url_base(mut self, base: String) -> Self {
        self.item_url_base = base;
        self
    }
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Listing failed; the error budget now holds `consecutive` failures.
    FetchFailed { consecutive: u32 },
    /// The store could not count the subject's records; nothing was touched.
    StoreUnavailable,
    /// History recorded without interaction. Items counted in `unrecorded`
    /// failed to persist and will be handled as new on a later cycle.
    FirstRun { recorded: usize, unrecorded: usize },
    SteadyState { fetched: usize, new_items: usize, store_errors: usize },
}

/// Why a monitor stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorExit {
    Escalated { failures: u32, last_error: String },
    Cancelled,
}

enum Backfill {
    NotFirstRun,
    StoreUnavailable,
    Recorded { recorded: usize, unrecorded: usize },
}

/// Watches one subject until it escalates or shutdown is signalled.
pub struct SubjectMonitor {
    subject_id: String,
    ctx: MonitorContext,
    budget: ErrorBudget,
    shutdown: ShutdownSignal,
}

impl SubjectMonitor {
    #[must_use]
    pub fn new(subject_id: String, ctx: MonitorContext, shutdown: ShutdownSignal) -> Self {
        let budget = ErrorBudget::new(ctx.error_ceiling);
        Self { subject_id, ctx, budget, shutdown }
    }

    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    #[must_use]
    pub const fn budget(&self) -> &ErrorBudget {
        &self.budget
    }

    pub async fn run(mut self) -> MonitorExit {
        tracing::info!(subject = %self.subject_id, "Monitor started");
        let exit = loop {
            if self.shutdown.is_triggered() {
                break MonitorExit::Cancelled;
            }
            match self.poll_once().await {
                Ok(report) => tracing::debug!(subject = %self.subject_id, ?report, "Cycle finished"),
                Err(exit) => break exit,
            }
            if self.shutdown.sleep(self.ctx.poll_interval).await {
                break MonitorExit::Cancelled;
            }
        };
        tracing::info!(subject = %self.subject_id, ?exit, "Monitor stopped");
        exit
    }

    /// Runs a single cycle. `Err` means the monitor must stop.
    pub async fn poll_once(&mut self) -> Result<CycleReport, MonitorExit> {
        let items = match self.ctx.platform.list_items(&self.subject_id).await {
            Ok(items) => {
                self.budget.record_success();
                items
            },
            Err(e) => {
                tracing::warn!(subject = %self.subject_id, error = %e, transient = e.is_transient(), "Listing items failed");
                return self.on_fetch_failure(&e.to_string()).await;
            },
        };

        match self.first_run_backfill(&items).await {
            Backfill::NotFirstRun => {},
            Backfill::StoreUnavailable => return Ok(CycleReport::StoreUnavailable),
            Backfill::Recorded { recorded, unrecorded } => {
                let name = items
                    .first()
                    .and_then(|item| item.author_nickname.as_deref())
                    .unwrap_or(&self.subject_id);
                tracing::info!(subject = %self.subject_id, recorded, unrecorded, "First run, history recorded without interaction");
                self.notify(&welcome_notice(name, recorded, unrecorded)).await;
                return Ok(CycleReport::FirstRun { recorded, unrecorded });
            },
        }

        let mut new_items = 0;
        let mut store_errors = 0;
        for item in &items {
            if self.shutdown.is_triggered() {
                return Err(MonitorExit::Cancelled);
            }
            match self.ctx.store.insert_if_absent(&item.to_seen_record()).await {
                Ok(true) => {},
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(subject = %self.subject_id, item_id = %item.id, error = %e, transient = e.is_transient(), "Store unavailable, skipping item this cycle");
                    store_errors += 1;
                    continue;
                },
            }
            new_items += 1;
            self.react(item).await;
        }

        Ok(CycleReport::SteadyState { fetched: items.len(), new_items, store_errors })
    }

    async fn on_fetch_failure(&mut self, error: &str) -> Result<CycleReport, MonitorExit> {
        if self.shutdown.sleep(self.ctx.error_cooldown).await {
            return Err(MonitorExit::Cancelled);
        }
        if !self.budget.record_failure() {
            return Ok(CycleReport::FetchFailed { consecutive: self.budget.consecutive() });
        }

        let failures = self.budget.consecutive();
        tracing::error!(subject = %self.subject_id, failures, error, "Error ceiling reached, stopping monitor");
        self.notify(&escalation_notice(&self.subject_id, failures, error)).await;
        Err(MonitorExit::Escalated { failures, last_error: error.to_owned() })
    }

    /// Under the store gate, decides whether this is the subject's first
    /// observation and, if so, records every item.
    async fn first_run_backfill(&self, items: &[Item]) -> Backfill {
        let _gate = self.ctx.store_gate.lock().await;
        let count = match self.ctx.store.count_for_subject(&self.subject_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(subject = %self.subject_id, error = %e, transient = e.is_transient(), "Cannot count seen items, skipping cycle");
                return Backfill::StoreUnavailable;
            },
        };
        // A single item on an empty subject is not enough evidence of history.
        if count != 0 || items.len() <= 1 {
            return Backfill::NotFirstRun;
        }

        let mut recorded = 0;
        let mut unrecorded = 0;
        for item in items {
            match self.ctx.store.insert_if_absent(&item.to_seen_record()).await {
                Ok(true) => recorded += 1,
                Ok(false) => {},
                Err(e) => {
                    tracing::warn!(subject = %self.subject_id, item_id = %item.id, error = %e, "Failed to record item during first run, it will be treated as new next cycle");
                    unrecorded += 1;
                },
            }
        }
        Backfill::Recorded { recorded, unrecorded }
    }

    async fn react(&self, item: &Item) {
        tracing::info!(subject = %self.subject_id, item_id = %item.id, title = %item.title, "New item");
        let outcome = self.ctx.pipeline.run(item).await;
        let text = item_notice(
            item,
            &outcome,
            &self.ctx.item_url_base,
            self.ctx.pipeline.auto_interact(),
        );
        self.notify(&text).await;
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.ctx.notifier.send(text).await {
            tracing::warn!(subject = %self.subject_id, error = %e, "Notification failed");
        }
    }
}
