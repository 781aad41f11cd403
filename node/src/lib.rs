//! Certification service node.
//!
//! The node is the central coordinator that:
//! - Loads configuration and initialises storage (migration, integrity check)
//! - Wires the fraud gate, certificate ledger, review engine and verification service
//! - Registers workflow listeners for metrics and notification delivery
//! - Serves the HTTP API until shutdown

pub mod config;
pub mod error;
pub mod metrics;
pub mod node;
pub mod notifications;
pub mod shutdown;

pub use config::{ClassifierConfig, Environment, NodeConfig, NotificationConfig};
pub use error::NodeError;
pub use metrics::WorkflowMetrics;
pub use node::{verify_chain_offline, AccreditNode};
pub use notifications::{LogNotifier, NotificationDispatcher, Notifier, NotifyError, WebhookNotifier};
pub use shutdown::{ShutdownController, ShutdownReason};
