//! Transition operations and their outcomes

use super::LifecycleState;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// A guarded lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Ready,
    Destroy,
}

impl Operation {
    /// Whether the operation may start from `state`
    pub(crate) fn allowed_from(self, state: LifecycleState) -> bool {
        match self {
            Self::Init => state.can_init(),
            Self::Ready => state.can_ready(),
            Self::Destroy => state.can_destroy(),
        }
    }

    /// Human-readable reason an attempt was ignored
    pub(crate) fn rejection(self) -> &'static str {
        match self {
            Self::Init => "init() can only be called once",
            Self::Ready => "ready() can only be called after init()",
            Self::Destroy => "destroy() can only be called once",
        }
    }
}

/// What a transition call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TransitionOutcome {
    /// The state moved from `from` to `to` and the slot hooks ran
    Applied {
        from: LifecycleState,
        to: LifecycleState,
    },
    /// The call was made from an invalid state and did nothing
    Ignored { state: LifecycleState },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }
}

/// Outcomes of the two steps performed by `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub init: TransitionOutcome,
    pub ready: TransitionOutcome,
}

impl StartOutcome {
    /// True when both `init` and `ready` were applied
    pub fn is_applied(&self) -> bool {
        self.init.is_applied() && self.ready.is_applied()
    }
}
