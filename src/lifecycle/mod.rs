//! Lifecycle Module
//!
//! This module tracks the application's lifecycle state and runs registered
//! hooks around initialization and destruction.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Uninitialized
//!    ↓  init()
//! 2. beforeInit hooks (in registration order)   ← Lifecycle Hook
//!    ↓
//! 3. Initialized
//!    ↓
//! 4. afterInit hooks                            ← Lifecycle Hook
//!    ↓  ready()
//! 5. Ready
//!    ↓
//! [Running...]
//!    ↓  destroy()
//! 6. beforeDestroy hooks                        ← Lifecycle Hook
//!    ↓
//! 7. Destroyed
//!    ↓
//! 8. afterDestroy hooks                         ← Lifecycle Hook
//! ```
//!
//! `reset()` returns to `Uninitialized` from any state. Calling a transition
//! from the wrong state is a no-op that reports one [`Notice`] to the
//! coordinator's [`DiagnosticSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use bmcs_core::lifecycle::{HookSlot, LifecycleCoordinator, sync_hook};
//!
//! let core = LifecycleCoordinator::global();
//!
//! core.on_named(HookSlot::BeforeInit, "Settings", sync_hook(|| {
//!     tracing::info!("Reading settings");
//!     Ok(())
//! }))
//! .after_init(|| async {
//!     tracing::info!("Opening connections");
//!     Ok(())
//! });
//!
//! core.start().await?;
//! ```

mod coordinator;
mod diagnostics;
mod error;
mod hooks;
mod registry;
mod shutdown;
mod state;
mod transition;

pub use coordinator::{CoordinatorBuilder, LifecycleCoordinator, LifecycleSnapshot};
pub use diagnostics::{DiagnosticSink, Notice, RecordingSink, SilentSink, TracingSink};
pub use error::{BoxError, LifecycleError, Result};
pub use hooks::{FnHook, HookResult, HookSlot, LifecycleHook, SyncHook, hook_fn, sync_hook};
pub use registry::HookCounts;
pub use shutdown::{destroy_after, destroy_on_shutdown, shutdown_signal};
pub use state::LifecycleState;
pub use transition::{Operation, StartOutcome, TransitionOutcome};
