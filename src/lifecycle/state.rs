//! Lifecycle states

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The state a [`LifecycleCoordinator`](super::LifecycleCoordinator) is in
///
/// ```text
/// Uninitialized ──init──▶ Initialized ──ready──▶ Ready
///       │                      │                   │
///       └──────────────── destroy ─────────────────┴──▶ Destroyed
///
/// reset: any state ──▶ Uninitialized
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Ready,
    Destroyed,
}

impl LifecycleState {
    /// Whether `init` is allowed from this state
    pub fn can_init(self) -> bool {
        self == Self::Uninitialized
    }

    /// Whether `ready` is allowed from this state
    pub fn can_ready(self) -> bool {
        self == Self::Initialized
    }

    /// Whether `destroy` is allowed from this state
    pub fn can_destroy(self) -> bool {
        self != Self::Destroyed
    }
}
