//! Events emitted after a workflow change commits.

use serde::Serialize;

use accredit_types::{ActivityId, CertificateHash, CertificateId, MemberRef};

/// Workflow-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// An activity entered `pending` (new submission or resubmission).
    Submitted {
        activity: ActivityId,
        owner: MemberRef,
        title: String,
    },
    InfoRequested {
        activity: ActivityId,
        owner: MemberRef,
        reason: String,
    },
    Approved {
        activity: ActivityId,
        owner: MemberRef,
        title: String,
    },
    Rejected {
        activity: ActivityId,
        owner: MemberRef,
        reason: String,
    },
    /// A fraud assessment was attached.
    Assessed {
        activity: ActivityId,
        degraded: bool,
    },
    CertificateIssued {
        activity: ActivityId,
        owner: MemberRef,
        title: String,
        certificate: CertificateId,
        hash: CertificateHash,
        block_number: u64,
    },
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::InfoRequested { .. } => "info_requested",
            Self::Approved { .. } => "approved",
            Self::Rejected { .. } => "rejected",
            Self::Assessed { .. } => "assessed",
            Self::CertificateIssued { .. } => "certificate_issued",
        }
    }
}

/// Synchronous fan-out event bus for workflow events.
///
/// Listeners are invoked inline on the emitting thread after the change is
/// durable; keep handlers fast and hand slow work to a task.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&WorkflowEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&WorkflowEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &WorkflowEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
