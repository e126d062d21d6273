use bmcs_core::prelude::*;
use bmcs_testing::{HookProbe, capture_logs};
use tracing::Level;

#[tokio::test]
async fn tracing_sink_emits_one_warning_per_ignored_call() {
    let (logs, _guard) = capture_logs();
    let core = LifecycleCoordinator::builder().name("storefront").build();
    let probe = HookProbe::new();
    core.on(HookSlot::BeforeInit, probe.sync("a"))
        .on(HookSlot::BeforeInit, probe.sync("b"))
        .on(HookSlot::BeforeInit, probe.sync("c"));

    core.init().await.unwrap();
    logs.clear();

    core.init().await.unwrap();

    let warnings = logs.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "init() can only be called once");
    assert_eq!(warnings[0].field("operation"), Some("init"));
    assert_eq!(warnings[0].field("state"), Some("Initialized"));
    assert_eq!(warnings[0].field("coordinator"), Some("storefront"));
}

#[tokio::test]
async fn applied_transitions_do_not_warn() {
    let (logs, _guard) = capture_logs();
    let core = LifecycleCoordinator::new();

    core.start().await.unwrap();
    core.destroy().await.unwrap();
    core.reset();

    assert!(logs.at_level(Level::WARN).is_empty());
    assert!(logs.has_event(Level::INFO, "Lifecycle state changed"));
}

#[tokio::test]
async fn hook_failure_is_logged_as_error() {
    let (logs, _guard) = capture_logs();
    let core = LifecycleCoordinator::builder()
        .diagnostics(SilentSink)
        .build();
    let probe = HookProbe::new();
    core.on_named(
        HookSlot::AfterInit,
        "Cache",
        probe.failing("cache", "cold"),
    );

    assert!(core.init().await.is_err());
    assert!(logs.has_event(Level::ERROR, "afterInit failed for Cache: cold"));
}

#[tokio::test]
async fn silent_sink_suppresses_notices() {
    let (logs, _guard) = capture_logs();
    let core = LifecycleCoordinator::builder()
        .diagnostics(SilentSink)
        .build();

    assert!(core.ready().is_ignored());
    assert!(logs.at_level(Level::WARN).is_empty());
}

#[tokio::test]
async fn shared_sink_collects_from_several_coordinators() {
    let sink = Arc::new(RecordingSink::new());
    let api = LifecycleCoordinator::builder()
        .name("api")
        .diagnostics(Arc::clone(&sink))
        .build();
    let worker = LifecycleCoordinator::builder()
        .name("worker")
        .diagnostics(Arc::clone(&sink))
        .build();

    api.ready();
    worker.destroy().await.unwrap();
    worker.destroy().await.unwrap();

    let sources: Vec<_> = sink
        .notices()
        .into_iter()
        .map(|n| (n.coordinator, n.operation))
        .collect();
    assert_eq!(
        sources,
        vec![
            ("api".to_string(), Operation::Ready),
            ("worker".to_string(), Operation::Destroy),
        ]
    );
}
