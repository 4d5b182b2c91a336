#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use notewatch_core::FallbackComments;
use notewatch_storage::MemoryStore;

use crate::fakes::{FakeGenerator, FakePlatform, FlakyStore, RecordingNotifier, item, record};
use crate::{
    CycleReport, InteractionPipeline, MonitorContext, MonitorExit, ShutdownSignal,
    ShutdownTrigger, SubjectMonitor, shutdown_channel,
};

struct Harness {
    platform: Arc<FakePlatform>,
    store: Arc<FlakyStore>,
    notifier: Arc<RecordingNotifier>,
    ctx: MonitorContext,
    trigger: ShutdownTrigger,
    signal: ShutdownSignal,
}

impl Harness {
    fn new(platform: FakePlatform, store: FlakyStore) -> Self {
        Self::with_notifier(platform, store, RecordingNotifier::default())
    }

    fn with_notifier(platform: FakePlatform, store: FlakyStore, notifier: RecordingNotifier) -> Self {
        let platform = Arc::new(platform);
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        let generator = Arc::new(FakeGenerator::replying("Looks great"));
        let pipeline = InteractionPipeline::new(
            platform.clone(),
            generator,
            FallbackComments::default(),
        )
        .with_delays(Duration::from_secs(1), Duration::from_secs(1));
        let ctx = MonitorContext::new(
            platform.clone(),
            store.clone(),
            notifier.clone(),
            Arc::new(pipeline),
        )
        .with_timing(Duration::from_secs(5), Duration::from_secs(60))
        .with_error_ceiling(3)
        .with_item_url_base("https://example.com/explore".to_owned());
        let (trigger, signal) = shutdown_channel();
        Self { platform, store, notifier, ctx, trigger, signal }
    }

    fn monitor(&self, subject_id: &str) -> SubjectMonitor {
        SubjectMonitor::new(subject_id.to_owned(), self.ctx.clone(), self.signal.clone())
    }

    fn likes(&self) -> Vec<String> {
        self.platform.calls_starting_with("like:")
    }
}

fn store_with(records: &[(&str, &str)]) -> FlakyStore {
    FlakyStore {
        inner: MemoryStore::with_records(records.iter().map(|(id, subject)| record(id, subject))),
        ..FlakyStore::default()
    }
}

#[tokio::test(start_paused = true)]
async fn first_run_records_history_without_interacting() {
    let platform = FakePlatform::new().with_listing(vec![
        item("a", "u1").with_author_nickname("alice"),
        item("b", "u1"),
        item("c", "u1"),
    ]);
    let h = Harness::new(platform, FlakyStore::default());

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::FirstRun { recorded: 3, unrecorded: 0 });
    assert_eq!(h.store.inner.len().unwrap(), 3);
    assert!(h.likes().is_empty());
    assert!(h.platform.calls_starting_with("comment:").is_empty());
    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Monitoring started"));
    assert!(messages[0].contains("alice"));
}

#[tokio::test(start_paused = true)]
async fn welcome_falls_back_to_subject_id() {
    let platform = FakePlatform::new().with_listing(vec![item("a", "u1"), item("b", "u1")]);
    let h = Harness::new(platform, FlakyStore::default());

    h.monitor("u1").poll_once().await.unwrap();

    assert!(h.notifier.messages()[0].contains("Subject: u1"));
}

#[tokio::test(start_paused = true)]
async fn single_item_on_empty_subject_is_treated_as_new() {
    let platform = FakePlatform::new().with_listing(vec![item("a", "u1")]);
    let h = Harness::new(platform, FlakyStore::default());

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::SteadyState { fetched: 1, new_items: 1, store_errors: 0 });
    assert_eq!(h.likes(), vec!["like:a"]);
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_item_after_history_runs_pipeline_and_notifies() {
    let history: Vec<(String, &str)> = (1..=5).map(|i| (format!("old{i}"), "u1")).collect();
    let history: Vec<(&str, &str)> = history.iter().map(|(id, s)| (id.as_str(), *s)).collect();
    let platform = FakePlatform::new().with_listing(vec![item("d", "u1")]);
    let h = Harness::new(platform, store_with(&history));

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::SteadyState { fetched: 1, new_items: 1, store_errors: 0 });
    assert_eq!(h.store.inner.len().unwrap(), 6);
    assert_eq!(h.likes(), vec!["like:d"]);
    assert_eq!(h.platform.calls_starting_with("comment:"), vec!["comment:d:Looks great"]);

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Link: https://example.com/explore/d"));
    assert!(messages[0].contains("Like: succeeded"));
    assert!(messages[0].contains("Comment: succeeded"));
    assert!(messages[0].contains("Comment text: Looks great"));
}

#[tokio::test(start_paused = true)]
async fn seen_items_are_never_reprocessed() {
    let platform = FakePlatform::new()
        .with_listing(vec![item("a", "u1"), item("b", "u1")])
        .with_listing(vec![item("new", "u1"), item("a", "u1"), item("b", "u1")])
        .with_listing(vec![item("new", "u1"), item("a", "u1"), item("b", "u1")]);
    let h = Harness::new(platform, store_with(&[("a", "u1"), ("b", "u1")]));
    let mut monitor = h.monitor("u1");

    let first = monitor.poll_once().await.unwrap();
    let second = monitor.poll_once().await.unwrap();
    let third = monitor.poll_once().await.unwrap();

    assert_eq!(first, CycleReport::SteadyState { fetched: 2, new_items: 0, store_errors: 0 });
    assert_eq!(second, CycleReport::SteadyState { fetched: 3, new_items: 1, store_errors: 0 });
    assert_eq!(third, CycleReport::SteadyState { fetched: 3, new_items: 0, store_errors: 0 });
    assert_eq!(h.likes(), vec!["like:new"]);
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn items_are_handled_in_listing_order() {
    let platform =
        FakePlatform::new().with_listing(vec![item("z", "u1"), item("x", "u1"), item("y", "u1")]);
    let h = Harness::new(platform, store_with(&[("old", "u1")]));

    h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(h.likes(), vec!["like:z", "like:x", "like:y"]);
}

#[tokio::test(start_paused = true)]
async fn count_failure_skips_the_whole_cycle() {
    let platform = FakePlatform::new().with_listing(vec![item("a", "u1"), item("b", "u1")]);
    let store = FlakyStore::default();
    store.fail_count.store(true, Ordering::SeqCst);
    let h = Harness::new(platform, store);

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::StoreUnavailable);
    assert_eq!(h.store.inserts.load(Ordering::SeqCst), 0);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn insert_failure_skips_only_that_item() {
    let platform =
        FakePlatform::new().with_listing(vec![item("a", "u1"), item("b", "u1"), item("c", "u1")]);
    let store = store_with(&[("old", "u1")]);
    store.fail_insert_for.lock().unwrap().push("b".to_owned());
    let h = Harness::new(platform, store);

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::SteadyState { fetched: 3, new_items: 2, store_errors: 1 });
    assert_eq!(h.likes(), vec!["like:a", "like:c"]);
}

#[tokio::test(start_paused = true)]
async fn first_run_insert_failure_is_reported_and_handled_next_cycle() {
    let listing = || vec![item("a", "u1"), item("b", "u1"), item("c", "u1")];
    let platform = FakePlatform::new().with_listing(listing()).with_listing(listing());
    let store = FlakyStore::default();
    store.fail_insert_for.lock().unwrap().push("b".to_owned());
    let h = Harness::new(platform, store);
    let mut monitor = h.monitor("u1");

    let report = monitor.poll_once().await.unwrap();
    assert_eq!(report, CycleReport::FirstRun { recorded: 2, unrecorded: 1 });
    assert!(h.likes().is_empty());
    assert!(h.notifier.messages()[0].contains("1 existing posts could not be saved"));

    h.store.fail_insert_for.lock().unwrap().clear();
    let report = monitor.poll_once().await.unwrap();
    assert_eq!(report, CycleReport::SteadyState { fetched: 3, new_items: 1, store_errors: 0 });
    assert_eq!(h.likes(), vec!["like:b"]);
}

#[tokio::test(start_paused = true)]
async fn notification_failure_does_not_break_the_cycle() {
    let platform = FakePlatform::new().with_listing(vec![item("a", "u1")]);
    let h = Harness::with_notifier(
        platform,
        store_with(&[("old", "u1")]),
        RecordingNotifier::failing(),
    );

    let report = h.monitor("u1").poll_once().await.unwrap();

    assert_eq!(report, CycleReport::SteadyState { fetched: 1, new_items: 1, store_errors: 0 });
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_failures_count_until_a_success_resets_them() {
    let platform = FakePlatform::new()
        .with_list_failure()
        .with_list_failure()
        .with_listing(Vec::new())
        .with_list_failure();
    let h = Harness::new(platform, FlakyStore::default());
    let mut monitor = h.monitor("u1");

    let started = tokio::time::Instant::now();
    assert_eq!(monitor.poll_once().await.unwrap(), CycleReport::FetchFailed { consecutive: 1 });
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert_eq!(monitor.poll_once().await.unwrap(), CycleReport::FetchFailed { consecutive: 2 });

    monitor.poll_once().await.unwrap();
    assert_eq!(monitor.budget().consecutive(), 0);

    assert_eq!(monitor.poll_once().await.unwrap(), CycleReport::FetchFailed { consecutive: 1 });
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reaching_the_ceiling_escalates_once_and_stops() {
    let platform = FakePlatform { fail_forever: true, ..FakePlatform::new() };
    let h = Harness::new(platform, FlakyStore::default());

    let exit = h.monitor("u1").run().await;

    let MonitorExit::Escalated { failures, last_error } = exit else {
        panic!("expected escalation, got {exit:?}");
    };
    assert_eq!(failures, 3);
    assert!(last_error.contains("scripted failure"));
    assert_eq!(h.platform.calls_starting_with("list:").len(), 3);

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Monitor alert"));
    assert!(messages[0].contains("u1"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_interval_sleep() {
    let h = Harness::new(FakePlatform::new(), FlakyStore::default());
    let monitor = h.monitor("u1");

    let task = tokio::spawn(monitor.run());
    tokio::time::sleep(Duration::from_secs(12)).await;
    h.trigger.trigger();

    assert_eq!(task.await.unwrap(), MonitorExit::Cancelled);
    assert!(h.platform.calls_starting_with("list:").len() >= 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_error_cooldown() {
    let platform = FakePlatform { fail_forever: true, ..FakePlatform::new() };
    let h = Harness::new(platform, FlakyStore::default());
    let mut monitor = h.monitor("u1");

    let task = tokio::spawn(async move { monitor.poll_once().await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.trigger.trigger();

    assert_eq!(task.await.unwrap(), Err(MonitorExit::Cancelled));
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_before_the_next_item() {
    let platform = FakePlatform::new().with_listing(vec![item("a", "u1"), item("b", "u1")]);
    let h = Harness::new(platform, store_with(&[("old", "u1")]));
    h.trigger.trigger();

    let result = h.monitor("u1").poll_once().await;

    assert_eq!(result, Err(MonitorExit::Cancelled));
    assert_eq!(h.store.inner.len().unwrap(), 1);
    assert!(h.likes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_first_runs_for_one_subject_backfill_once() {
    let listing = || vec![item("a", "u1"), item("b", "u1"), item("c", "u1")];
    let platform = FakePlatform::new().with_listing(listing()).with_listing(listing());
    let h = Harness::new(platform, FlakyStore::default());
    let mut left = h.monitor("u1");
    let mut right = h.monitor("u1");

    let (l, r) = tokio::join!(left.poll_once(), right.poll_once());
    let mut reports = vec![l.unwrap(), r.unwrap()];
    reports.sort_by_key(|r| matches!(r, CycleReport::FirstRun { .. }));

    assert_eq!(reports[0], CycleReport::SteadyState { fetched: 3, new_items: 0, store_errors: 0 });
    assert_eq!(reports[1], CycleReport::FirstRun { recorded: 3, unrecorded: 0 });
    assert!(h.likes().is_empty());
    assert_eq!(h.notifier.messages().len(), 1);
}
