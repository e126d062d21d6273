//! Diagnostic notices for ignored transitions
//!
//! An invalid transition attempt is absorbed by the coordinator. It reports
//! exactly one [`Notice`] per call to the configured [`DiagnosticSink`], so
//! hosts can route, silence or assert on them.

use super::{LifecycleState, Operation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// A report about a transition attempt that was ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Name of the coordinator that ignored the call
    pub coordinator: String,
    /// The operation that was attempted
    pub operation: Operation,
    /// State the coordinator was in
    pub state: LifecycleState,
    /// Human-readable explanation
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(
        coordinator: impl Into<String>,
        operation: Operation,
        state: LifecycleState,
    ) -> Self {
        Self {
            coordinator: coordinator.into(),
            operation,
            state,
            message: operation.rejection().to_string(),
            at: Utc::now(),
        }
    }
}

/// Receives notices from a coordinator
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, notice: &Notice);
}

/// Emits each notice as a `tracing` warning. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, notice: &Notice) {
        tracing::warn!(
            coordinator = %notice.coordinator,
            operation = %notice.operation,
            state = %notice.state,
            "{}",
            notice.message
        );
    }
}

/// Drops every notice
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _notice: &Notice) {}
}

/// Keeps notices in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn report(&self, notice: &Notice) {
        (**self).report(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_buffer() {
        let sink = RecordingSink::new();
        let handle = sink.clone();

        sink.report(&Notice::new("app", Operation::Init, LifecycleState::Ready));
        sink.report(&Notice::new(
            "app",
            Operation::Ready,
            LifecycleState::Uninitialized,
        ));

        let notices = handle.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "init() can only be called once");
        assert_eq!(notices[1].operation, Operation::Ready);
        assert_eq!(notices[1].state, LifecycleState::Uninitialized);

        handle.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_silent_sink_accepts_notices() {
        SilentSink.report(&Notice::new(
            "app",
            Operation::Destroy,
            LifecycleState::Destroyed,
        ));
    }
}
