//! Review Workflow Engine.
//!
//! Orchestrates an activity from submission to `certified` or `rejected`:
//! role guards first, then the central transition table, then a
//! compare-and-swap write on the observed status. Certification is handed
//! to the certificate ledger; fraud advice is attached for audit only and
//! never drives a transition.

pub mod caller;
pub mod engine;
pub mod error;
pub mod events;

pub use caller::Caller;
pub use engine::ReviewEngine;
pub use error::WorkflowError;
pub use events::{EventBus, WorkflowEvent};
