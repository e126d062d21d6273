//! Test helpers for code built on `bmcs-core`.
//!
//! - [`HookProbe`] hands out hooks that append labels to a shared log, so
//!   tests can assert on execution order.
//! - [`capture_logs`] installs a thread-local `tracing` subscriber that keeps
//!   events in memory.

use bmcs_core::lifecycle::{LifecycleHook, LifecycleState, hook_fn, sync_hook};
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Ordered record of hook executions
#[derive(Clone, Default)]
pub struct HookProbe {
    events: Arc<Mutex<Vec<String>>>,
}

impl HookProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label by hand
    pub fn record(&self, label: impl Into<String>) {
        self.events.lock().unwrap().push(label.into());
    }

    /// Labels recorded so far, oldest first
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// A hook that records `label` without suspending
    pub fn sync(&self, label: impl Into<String>) -> Arc<dyn LifecycleHook> {
        let probe = self.clone();
        let label = label.into();
        Arc::new(sync_hook(move || {
            probe.record(label.clone());
            Ok(())
        }))
    }

    /// A hook that suspends a few times before recording `label`
    pub fn deferred(&self, label: impl Into<String>) -> Arc<dyn LifecycleHook> {
        let probe = self.clone();
        let label = label.into();
        Arc::new(hook_fn(move || {
            let probe = probe.clone();
            let label = label.clone();
            async move {
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                probe.record(label);
                Ok(())
            }
        }))
    }

    /// A hook that records `label` and then fails with `message`
    pub fn failing(
        &self,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Arc<dyn LifecycleHook> {
        let probe = self.clone();
        let label = label.into();
        let message = message.into();
        Arc::new(sync_hook(move || {
            probe.record(label.clone());
            Err(anyhow::anyhow!(message.clone()))
        }))
    }

    /// A hook that records `label@<state>` using `read_state` at run time
    pub fn observe<F>(&self, label: impl Into<String>, read_state: F) -> Arc<dyn LifecycleHook>
    where
        F: Fn() -> LifecycleState + Send + Sync + 'static,
    {
        let probe = self.clone();
        let label = label.into();
        Arc::new(sync_hook(move || {
            probe.record(format!("{}@{}", label, read_state()));
            Ok(())
        }))
    }
}

/// A captured tracing event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Field key-value pairs, excluding the message
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Events captured by [`capture_logs`]
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events at exactly `level`
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn has_event(&self, level: Level, message_contains: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.level == level && e.message.contains(message_contains))
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.logs.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_owned(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Capture every `tracing` event emitted on the current thread
///
/// Keep the returned guard alive for as long as events should be captured.
/// Use a current-thread runtime (the `#[tokio::test]` default) so async code
/// stays on the capturing thread.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let layer = CaptureLayer { logs: logs.clone() };

    let guard = tracing_subscriber::registry()
        .with(layer)
        .with(LevelFilter::TRACE)
        .set_default();

    (logs, guard)
}
