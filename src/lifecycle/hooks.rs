//! Lifecycle hook contracts
//!
//! A hook is a zero-argument unit of work run by the coordinator at one of
//! the four [`HookSlot`]s. It may finish immediately or after awaiting
//! something; its success value is ignored.

use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Result returned by every hook
pub type HookResult = anyhow::Result<()>;

/// The four fixed registration points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum HookSlot {
    BeforeInit,
    AfterInit,
    BeforeDestroy,
    AfterDestroy,
}

/// A callback run by the coordinator during a transition
///
/// # Example
///
/// ```rust,ignore
/// use bmcs_core::lifecycle::{HookResult, HookSlot, LifecycleHook};
/// use async_trait::async_trait;
///
/// struct WarmCache {
///     cache: Arc<Cache>,
/// }
///
/// #[async_trait]
/// impl LifecycleHook for WarmCache {
///     async fn run(&self) -> HookResult {
///         self.cache.load_hot_keys().await?;
///         Ok(())
///     }
/// }
///
/// coordinator.on_named(HookSlot::AfterInit, "WarmCache", WarmCache { cache });
/// ```
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Run the hook to completion
    async fn run(&self) -> HookResult;
}

#[async_trait]
impl<H: LifecycleHook + ?Sized> LifecycleHook for Arc<H> {
    async fn run(&self) -> HookResult {
        (**self).run().await
    }
}

/// Hook backed by a closure returning a future
pub struct FnHook<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> LifecycleHook for FnHook<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HookResult> + Send + 'static,
{
    async fn run(&self) -> HookResult {
        (self.f)().await
    }
}

/// Hook backed by a closure that completes synchronously
pub struct SyncHook<F> {
    f: F,
}

#[async_trait]
impl<F> LifecycleHook for SyncHook<F>
where
    F: Fn() -> HookResult + Send + Sync,
{
    async fn run(&self) -> HookResult {
        (self.f)()
    }
}

/// Wrap an async closure as a [`LifecycleHook`]
pub fn hook_fn<F, Fut>(f: F) -> FnHook<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HookResult> + Send + 'static,
{
    FnHook { f }
}

/// Wrap a synchronous closure as a [`LifecycleHook`]
pub fn sync_hook<F>(f: F) -> SyncHook<F>
where
    F: Fn() -> HookResult + Send + Sync,
{
    SyncHook { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strum::IntoEnumIterator;

    #[test]
    fn test_slot_names() {
        let names: Vec<String> = HookSlot::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["beforeInit", "afterInit", "beforeDestroy", "afterDestroy"]
        );
    }

    #[tokio::test]
    async fn test_closure_hooks_run() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let async_hook = hook_fn(move || {
            let counter = Arc::clone(&counter);
            async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let counter = Arc::clone(&calls);
        let blocking = sync_hook(move || {
            counter.fetch_add(10, Ordering::SeqCst);
            Ok(())
        });

        async_hook.run().await.unwrap();
        blocking.run().await.unwrap();
        async_hook.run().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_hook_error_is_returned() {
        let failing = sync_hook(|| Err(anyhow::anyhow!("boom")));
        let err = failing.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
