//! Graceful Shutdown
//!
//! Ties OS signals to [`LifecycleCoordinator::destroy`].

use super::{LifecycleCoordinator, Result, TransitionOutcome};
use std::future::Future;
use tokio::signal;

/// Wait for Ctrl+C or SIGTERM, then destroy the coordinator
///
/// # Example
///
/// ```rust,ignore
/// use bmcs_core::lifecycle::{LifecycleCoordinator, destroy_on_shutdown};
///
/// let core = LifecycleCoordinator::global();
/// core.start().await?;
///
/// tokio::spawn(async move {
///     if let Err(e) = destroy_on_shutdown(core).await {
///         tracing::error!("Shutdown hooks failed: {}", e);
///     }
/// });
/// ```
pub async fn destroy_on_shutdown(
    coordinator: &LifecycleCoordinator,
) -> Result<TransitionOutcome> {
    destroy_after(coordinator, shutdown_signal()).await
}

/// Wait for `signal` to complete, then destroy the coordinator
pub async fn destroy_after<F>(
    coordinator: &LifecycleCoordinator,
    signal: F,
) -> Result<TransitionOutcome>
where
    F: Future<Output = ()>,
{
    signal.await;
    tracing::info!("Starting graceful shutdown of {}...", coordinator.name());
    let outcome = coordinator.destroy().await?;
    tracing::info!("Graceful shutdown complete");
    Ok(outcome)
}

/// Create a future that completes when a shutdown signal is received
///
/// If a signal handler cannot be installed the error is logged and that
/// signal is never observed.
///
/// # Example
///
/// ```rust,ignore
/// use bmcs_core::lifecycle::shutdown_signal;
///
/// tokio::select! {
///     _ = shutdown_signal() => {
///         println!("Shutdown signal received");
///     }
///     _ = server.serve() => {}
/// }
/// ```
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{LifecycleState, SilentSink};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_destroy_after_waits_for_signal() {
        let core = Arc::new(
            LifecycleCoordinator::builder()
                .diagnostics(SilentSink)
                .build(),
        );
        let destroyed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&destroyed);
        core.after_destroy(move || {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });
        core.start().await.unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let task_core = Arc::clone(&core);
        let handle = tokio::spawn(async move {
            destroy_after(&task_core, async {
                let _ = rx.await;
            })
            .await
        });

        tokio::task::yield_now().await;
        assert_eq!(core.state(), LifecycleState::Ready);
        assert!(!destroyed.load(Ordering::SeqCst));

        tx.send(()).unwrap();
        let outcome = handle.await.unwrap().unwrap();

        assert!(outcome.is_applied());
        assert_eq!(core.state(), LifecycleState::Destroyed);
        assert!(destroyed.load(Ordering::SeqCst));
    }
}
