//! Lifecycle Coordinator
//!
//! Owns the lifecycle state and the hook registry, and drives the
//! transitions between states.

use super::registry::{HookCounts, HookRegistry};
use super::{
    DiagnosticSink, HookResult, HookSlot, LifecycleError, LifecycleHook, LifecycleState, Notice,
    Operation, Result, StartOutcome, TracingSink, TransitionOutcome, hook_fn,
};
use crate::config::CoordinatorConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

static GLOBAL: OnceLock<LifecycleCoordinator> = OnceLock::new();

struct StateCell {
    state: LifecycleState,
    changed_at: Option<DateTime<Utc>>,
    /// Transitions whose hooks are still running
    in_flight: Vec<Operation>,
}

/// Marks an operation as running until dropped
struct InFlight<'a> {
    cell: &'a Mutex<StateCell>,
    operation: Operation,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.cell).in_flight.retain(|op| *op != self.operation);
    }
}

/// Tracks the application lifecycle and runs hooks around `init` and `destroy`
///
/// The coordinator is usually shared process-wide through [`global`](Self::global),
/// but it is an ordinary value: a composition root can build its own with
/// [`builder`](Self::builder) and hand out references, and tests can create a
/// fresh one per case.
///
/// Registration takes `&self` and returns `&Self`, so hooks can be chained:
///
/// ```rust,ignore
/// use bmcs_core::lifecycle::LifecycleCoordinator;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let core = LifecycleCoordinator::global();
///
///     core.before_init(|| async {
///         tracing::info!("Loading configuration");
///         Ok(())
///     })
///     .after_destroy(|| async {
///         tracing::info!("Flushed");
///         Ok(())
///     });
///
///     core.start().await?;
///     // ... application runs ...
///     core.destroy().await?;
///     Ok(())
/// }
/// ```
///
/// A second `init` made while the first is still running its hooks is
/// ignored, and the same holds for `destroy`. Hooks may drive other
/// transitions on their own coordinator, e.g. an `afterInit` hook that
/// calls `destroy`.
pub struct LifecycleCoordinator {
    id: Uuid,
    config: CoordinatorConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
    state: Mutex<StateCell>,
    hooks: Mutex<HookRegistry>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("hooks", &self.hook_counts())
            .finish()
    }
}

impl LifecycleCoordinator {
    /// Create a coordinator with default configuration and the tracing sink
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new coordinator builder
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// The process-wide coordinator
    ///
    /// Created on first call from [`CoordinatorConfig::from_env`]; every
    /// later call returns the same instance.
    pub fn global() -> &'static LifecycleCoordinator {
        GLOBAL.get_or_init(|| {
            let coordinator = Self::builder()
                .config(CoordinatorConfig::from_env())
                .build();
            tracing::debug!(
                "Created global lifecycle coordinator {} ({})",
                coordinator.config.name,
                coordinator.id
            );
            coordinator
        })
    }

    /// Unique id of this instance
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        lock(&self.state).state
    }

    /// Initialize the application
    ///
    /// From `Uninitialized`: runs the `beforeInit` hooks, moves to
    /// `Initialized`, then runs the `afterInit` hooks. From any other state,
    /// or while another `init` is still running, the call reports a notice
    /// and does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::HookFailed`] if a hook fails. Remaining
    /// hooks are skipped and nothing is rolled back: a failing `beforeInit`
    /// hook leaves the state unchanged, a failing `afterInit` hook leaves it
    /// `Initialized`.
    pub async fn init(&self) -> Result<TransitionOutcome> {
        let (from, in_flight) = self.begin(Operation::Init);
        let Some(_in_flight) = in_flight else {
            return Ok(self.ignore(Operation::Init, from));
        };

        tracing::info!("Initializing {}...", self.config.name);
        self.run_hooks(HookSlot::BeforeInit).await?;
        self.set_state(LifecycleState::Initialized);
        self.run_hooks(HookSlot::AfterInit).await?;

        Ok(TransitionOutcome::Applied {
            from,
            to: LifecycleState::Initialized,
        })
    }

    /// Mark the application ready. Only valid from `Initialized`.
    pub fn ready(&self) -> TransitionOutcome {
        let from = {
            let mut cell = lock(&self.state);
            let from = cell.state;
            if Operation::Ready.allowed_from(from) {
                cell.state = LifecycleState::Ready;
                cell.changed_at = Some(Utc::now());
            }
            from
        };

        if !Operation::Ready.allowed_from(from) {
            return self.ignore(Operation::Ready, from);
        }

        self.log_change(from, LifecycleState::Ready);
        TransitionOutcome::Applied {
            from,
            to: LifecycleState::Ready,
        }
    }

    /// Destroy the application
    ///
    /// From any state but `Destroyed`: runs the `beforeDestroy` hooks, moves
    /// to `Destroyed`, then runs the `afterDestroy` hooks.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::HookFailed`] if a hook fails, with the same
    /// no-rollback behavior as [`init`](Self::init).
    pub async fn destroy(&self) -> Result<TransitionOutcome> {
        let (from, in_flight) = self.begin(Operation::Destroy);
        let Some(_in_flight) = in_flight else {
            return Ok(self.ignore(Operation::Destroy, from));
        };

        tracing::info!("Destroying {}...", self.config.name);
        self.run_hooks(HookSlot::BeforeDestroy).await?;
        self.set_state(LifecycleState::Destroyed);
        self.run_hooks(HookSlot::AfterDestroy).await?;

        Ok(TransitionOutcome::Applied {
            from,
            to: LifecycleState::Destroyed,
        })
    }

    /// Move back to `Uninitialized` from any state, returning the previous state
    ///
    /// Registered hooks are kept.
    pub fn reset(&self) -> LifecycleState {
        self.set_state(LifecycleState::Uninitialized)
    }

    /// `init` followed by `ready`
    ///
    /// `ready` is still attempted when `init` was ignored, and reports its
    /// own notice if the state does not allow it.
    pub async fn start(&self) -> Result<StartOutcome> {
        let init = self.init().await?;
        let ready = self.ready();
        Ok(StartOutcome { init, ready })
    }

    /// Register an async `beforeInit` hook
    pub fn before_init<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on(HookSlot::BeforeInit, hook_fn(hook))
    }

    /// Register an async `afterInit` hook
    pub fn after_init<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on(HookSlot::AfterInit, hook_fn(hook))
    }

    /// Register an async `beforeDestroy` hook
    pub fn before_destroy<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on(HookSlot::BeforeDestroy, hook_fn(hook))
    }

    /// Register an async `afterDestroy` hook
    pub fn after_destroy<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        self.on(HookSlot::AfterDestroy, hook_fn(hook))
    }

    /// Register any [`LifecycleHook`] in a slot
    pub fn on<H>(&self, slot: HookSlot, hook: H) -> &Self
    where
        H: LifecycleHook + 'static,
    {
        lock(&self.hooks).push(slot, None, Arc::new(hook));
        self
    }

    /// Register a hook with a label used in logs and errors
    pub fn on_named<H>(&self, slot: HookSlot, name: impl Into<String>, hook: H) -> &Self
    where
        H: LifecycleHook + 'static,
    {
        lock(&self.hooks).push(slot, Some(name.into()), Arc::new(hook));
        self
    }

    /// Number of hooks registered in a slot
    pub fn hook_count(&self, slot: HookSlot) -> usize {
        lock(&self.hooks).len(slot)
    }

    pub fn hook_counts(&self) -> HookCounts {
        lock(&self.hooks).counts()
    }

    /// Remove every registered hook from every slot
    pub fn clear_hooks(&self) {
        lock(&self.hooks).clear();
        tracing::debug!("Cleared lifecycle hooks of {}", self.config.name);
    }

    /// Serializable view of the coordinator
    pub fn snapshot(&self) -> LifecycleSnapshot {
        let (state, changed_at) = {
            let cell = lock(&self.state);
            (cell.state, cell.changed_at)
        };
        LifecycleSnapshot {
            id: self.id,
            name: self.config.name.clone(),
            state,
            hooks: self.hook_counts(),
            changed_at,
        }
    }

    /// Check the guard for `operation` and mark it running in one step
    ///
    /// Returns `None` when the state forbids the operation or the same
    /// operation is already running.
    fn begin(&self, operation: Operation) -> (LifecycleState, Option<InFlight<'_>>) {
        let mut cell = lock(&self.state);
        let from = cell.state;
        if !operation.allowed_from(from) || cell.in_flight.contains(&operation) {
            return (from, None);
        }
        cell.in_flight.push(operation);
        let in_flight = InFlight {
            cell: &self.state,
            operation,
        };
        (from, Some(in_flight))
    }

    async fn run_hooks(&self, slot: HookSlot) -> Result<()> {
        let hooks = lock(&self.hooks).snapshot(slot);
        if hooks.is_empty() {
            return Ok(());
        }

        tracing::info!("Calling {} hooks...", slot);

        for (position, entry) in hooks.iter().enumerate() {
            if self.config.trace_hooks {
                tracing::debug!("Running {}: {}", slot, entry.name);
            }
            entry.hook.run().await.map_err(|e| {
                tracing::error!("{} failed for {}: {:#}", slot, entry.name, e);
                LifecycleError::hook_failed(slot, &entry.name, position, e)
            })?;
        }

        tracing::info!("{} complete ({} hooks executed)", slot, hooks.len());
        Ok(())
    }

    /// Store a new state and return the previous one
    fn set_state(&self, to: LifecycleState) -> LifecycleState {
        let from = {
            let mut cell = lock(&self.state);
            let from = cell.state;
            cell.state = to;
            cell.changed_at = Some(Utc::now());
            from
        };
        self.log_change(from, to);
        from
    }

    fn log_change(&self, from: LifecycleState, to: LifecycleState) {
        tracing::info!(
            coordinator = %self.config.name,
            %from,
            %to,
            "Lifecycle state changed"
        );
    }

    fn ignore(&self, operation: Operation, state: LifecycleState) -> TransitionOutcome {
        self.diagnostics
            .report(&Notice::new(&self.config.name, operation, state));
        TransitionOutcome::Ignored { state }
    }
}

/// Point-in-time view of a coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSnapshot {
    pub id: Uuid,
    pub name: String,
    pub state: LifecycleState,
    pub hooks: HookCounts,
    /// When the state was last written, `None` if never
    pub changed_at: Option<DateTime<Utc>>,
}

/// Builder for [`LifecycleCoordinator`]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorBuilder {
    /// Create a new builder with default configuration and the tracing sink
    pub fn new() -> Self {
        Self {
            config: CoordinatorConfig::default(),
            diagnostics: Arc::new(TracingSink),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the name used in logs and notices
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set where notices about ignored transitions go
    pub fn diagnostics<S>(mut self, sink: S) -> Self
    where
        S: DiagnosticSink + 'static,
    {
        self.diagnostics = Arc::new(sink);
        self
    }

    pub fn build(self) -> LifecycleCoordinator {
        LifecycleCoordinator {
            id: Uuid::new_v4(),
            config: self.config,
            diagnostics: self.diagnostics,
            state: Mutex::new(StateCell {
                state: LifecycleState::Uninitialized,
                changed_at: None,
                in_flight: Vec::new(),
            }),
            hooks: Mutex::new(HookRegistry::default()),
        }
    }
}
