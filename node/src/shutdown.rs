//! Graceful shutdown.
//!
//! The first trigger wins: an OS signal or a programmatic request records a
//! [`ShutdownReason`] in a `tokio::sync::watch` channel, and every waiter,
//! including ones that start waiting afterwards, observes it.

use std::future::Future;

use tokio::signal;
use tokio::sync::watch;

/// Why the node is stopping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// [`ShutdownController::shutdown`] was called.
    Requested,
}

pub struct ShutdownController {
    tx: watch::Sender<Option<ShutdownReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// The recorded reason, once shutdown has started.
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    /// Resolves with the reason once shutdown has started.
    pub fn signalled(&self) -> impl Future<Output = ShutdownReason> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            match rx.wait_for(Option::is_some).await {
                Ok(reason) => reason.unwrap_or(ShutdownReason::Requested),
                // The controller is gone, so nobody is left to keep us running.
                Err(_) => ShutdownReason::Requested,
            }
        }
    }

    /// Start shutdown programmatically. Later triggers keep the first reason.
    pub fn shutdown(&self) {
        self.trigger(ShutdownReason::Requested);
    }

    fn trigger(&self, reason: ShutdownReason) {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            tracing::info!(?reason, "shutting down");
        }
    }

    /// Wait for SIGINT or SIGTERM and record it. Returns early if shutdown
    /// was already started some other way.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => self.trigger(ShutdownReason::Interrupt),
            _ = terminate => self.trigger(ShutdownReason::Terminate),
            _ = self.signalled() => {}
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_waiters_still_see_shutdown() {
        let controller = ShutdownController::new();
        assert_eq!(controller.reason(), None);
        controller.shutdown();
        assert_eq!(controller.signalled().await, ShutdownReason::Requested);
    }

    #[tokio::test]
    async fn first_reason_is_kept() {
        let controller = ShutdownController::new();
        let waiter = controller.signalled();
        controller.trigger(ShutdownReason::Terminate);
        controller.shutdown();
        assert_eq!(waiter.await, ShutdownReason::Terminate);
        assert_eq!(controller.reason(), Some(ShutdownReason::Terminate));
    }

    #[tokio::test]
    async fn signal_wait_returns_after_programmatic_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), controller.wait_for_signal())
            .await
            .expect("wait_for_signal should return once shutdown started");
    }
}
