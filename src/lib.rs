//! # bmcs-core
//!
//! A process-wide application lifecycle coordinator.
//!
//! The coordinator moves an application through `Uninitialized`,
//! `Initialized`, `Ready` and `Destroyed`, and runs hooks registered by
//! the rest of the application right before and after `init` and `destroy`.
//!
//! ## Features
//!
//! - **Guarded transitions**: invalid calls are absorbed and reported, never panicked on
//! - **Ordered hooks**: sync or async, run one at a time in registration order
//! - **Fluent registration**: every registration returns the coordinator
//! - **Injectable diagnostics**: route notices to `tracing`, memory, or nowhere
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bmcs_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let core = LifecycleCoordinator::global();
//!
//!     core.before_init(|| async {
//!         // load settings
//!         Ok(())
//!     })
//!     .before_destroy(|| async {
//!         // drain work
//!         Ok(())
//!     });
//!
//!     core.start().await?;
//!     assert_eq!(core.state(), LifecycleState::Ready);
//!
//!     destroy_on_shutdown(core).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod lifecycle;

// Re-export core types
pub use config::CoordinatorConfig;
pub use lifecycle::{
    HookSlot, LifecycleCoordinator, LifecycleError, LifecycleState, Result, TransitionOutcome,
};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use bmcs_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::CoordinatorConfig;
    pub use crate::lifecycle::{
        CoordinatorBuilder, DiagnosticSink, HookResult, HookSlot, LifecycleCoordinator,
        LifecycleError, LifecycleHook, LifecycleSnapshot, LifecycleState, Notice, Operation,
        RecordingSink, SilentSink, StartOutcome, TracingSink, TransitionOutcome, destroy_after,
        destroy_on_shutdown, hook_fn, shutdown_signal, sync_hook,
    };
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
