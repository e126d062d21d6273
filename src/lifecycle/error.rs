//! Lifecycle-specific error types

use super::HookSlot;
use thiserror::Error;

/// Boxed error carried out of a failing hook
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during lifecycle transitions
///
/// Invalid transitions are not errors: they are reported to the diagnostic
/// sink and surface as [`TransitionOutcome::Ignored`](super::TransitionOutcome::Ignored).
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A hook returned an error; the remaining hooks of the transition were skipped
    #[error("{slot} hook '{hook}' (position {position}) failed: {source}")]
    HookFailed {
        /// Slot the failing hook was registered in
        slot: HookSlot,
        /// Label of the failing hook
        hook: String,
        /// Zero-based position of the hook within its slot
        position: usize,
        /// Error returned by the hook
        #[source]
        source: BoxError,
    },
}

impl LifecycleError {
    /// Create a hook failure error
    pub fn hook_failed(
        slot: HookSlot,
        hook: impl Into<String>,
        position: usize,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::HookFailed {
            slot,
            hook: hook.into(),
            position,
            source: source.into(),
        }
    }

    /// Slot in which the failure happened
    pub fn slot(&self) -> HookSlot {
        match self {
            Self::HookFailed { slot, .. } => *slot,
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_hook_failed_display_and_source() {
        let err = LifecycleError::hook_failed(
            HookSlot::BeforeInit,
            "open-db",
            2,
            anyhow::anyhow!("connection refused"),
        );

        assert_eq!(
            err.to_string(),
            "beforeInit hook 'open-db' (position 2) failed: connection refused"
        );
        assert_eq!(err.slot(), HookSlot::BeforeInit);
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
    }
}
