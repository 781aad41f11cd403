//! Fire-and-forget delivery of workflow events.
//!
//! The [`EventBus`](accredit_workflow::EventBus) calls listeners
//! synchronously after a transition commits. The dispatcher's listener only
//! clones the event and spawns delivery onto the runtime, so a slow or
//! failing notifier can never hold up or undo a transition.

use std::sync::Arc;
use std::time::Duration;

use accredit_workflow::WorkflowEvent;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification endpoint returned {0}")]
    Status(u16),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn notify(&self, event: &WorkflowEvent) -> Result<(), NotifyError>;
}

/// Writes events to the log only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, event: &WorkflowEvent) -> Result<(), NotifyError> {
        tracing::info!(event = event.name(), payload = ?event, "workflow notification");
        Ok(())
    }
}

/// POSTs each event as JSON to a webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, event: &WorkflowEvent) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Bridges the synchronous event bus to an async [`Notifier`].
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    runtime: Handle,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, runtime: Handle) -> Self {
        Self { notifier, runtime }
    }

    /// Spawn delivery of `event`. Failures are logged and dropped.
    pub fn dispatch(&self, event: &WorkflowEvent) {
        let notifier = self.notifier.clone();
        let event = event.clone();
        self.runtime.spawn(async move {
            if let Err(e) = notifier.notify(&event).await {
                tracing::warn!(
                    notifier = notifier.name(),
                    event = event.name(),
                    error = %e,
                    "notification dropped"
                );
            }
        });
    }

    pub fn into_listener(self) -> Box<dyn Fn(&WorkflowEvent) + Send + Sync> {
        Box::new(move |event| self.dispatch(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredit_types::{ActivityId, MemberRef, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn notify(&self, _event: &WorkflowEvent) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::Status(500))
            } else {
                Ok(())
            }
        }
    }

    fn approved() -> WorkflowEvent {
        WorkflowEvent::Approved {
            activity: ActivityId::new(2026, 1),
            owner: MemberRef {
                id: UserId::new("student-1").unwrap(),
                display_name: "Asha".into(),
            },
            title: "Hackathon winner".into(),
        }
    }

    async fn settle(calls: &AtomicUsize, expected: usize) {
        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn listener_delivers_in_background() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = Arc::new(Counting {
            calls: calls.clone(),
            fail: false,
        });
        let listener = NotificationDispatcher::new(notifier, Handle::current()).into_listener();
        listener(&approved());
        listener(&approved());
        settle(&calls, 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifier = Arc::new(Counting {
            calls: calls.clone(),
            fail: true,
        });
        let dispatcher = NotificationDispatcher::new(notifier, Handle::current());
        dispatcher.dispatch(&approved());
        settle(&calls, 1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        assert!(LogNotifier.notify(&approved()).await.is_ok());
    }
}
