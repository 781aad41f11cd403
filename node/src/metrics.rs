//! Prometheus metrics for the review workflow.
//!
//! Registered into the same [`Registry`] as the HTTP API's collectors, so
//! the `/metrics` endpoint exposes both.

use accredit_workflow::WorkflowEvent;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub struct WorkflowMetrics {
    /// Committed workflow events by name.
    pub events: IntCounterVec,
    /// Fraud assessments that fell back to manual review.
    pub degraded_assessments: IntCounter,
    /// Certificates on the chain.
    pub chain_length: IntGauge,
}

impl WorkflowMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let events = IntCounterVec::new(
            Opts::new("accredit_workflow_events_total", "Committed workflow events"),
            &["event"],
        )?;
        registry.register(Box::new(events.clone()))?;

        let degraded_assessments = IntCounter::with_opts(Opts::new(
            "accredit_degraded_assessments_total",
            "Fraud assessments degraded to manual review"
        ))?;
        registry.register(Box::new(degraded_assessments.clone()))?;

        let chain_length = IntGauge::with_opts(Opts::new(
            "accredit_chain_length",
            "Certificates on the chain"
        ))?;
        registry.register(Box::new(chain_length.clone()))?;

        Ok(Self {
            events,
            degraded_assessments,
            chain_length,
        })
    }

    pub fn observe(&self, event: &WorkflowEvent) {
        self.events.with_label_values(&[event.name()]).inc();
        match event {
            WorkflowEvent::Assessed { degraded: true, .. } => self.degraded_assessments.inc(),
            WorkflowEvent::CertificateIssued { block_number, .. } => {
                self.chain_length.set(i64::try_from(*block_number).unwrap_or(i64::MAX));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredit_types::ActivityId;

    #[test]
    fn degraded_assessments_are_counted() {
        let registry = Registry::new();
        let metrics = WorkflowMetrics::register(&registry).unwrap();
        let id = ActivityId::new(2026, 1);
        metrics.observe(&WorkflowEvent::Assessed {
            activity: id.clone(),
            degraded: true,
        });
        metrics.observe(&WorkflowEvent::Assessed {
            activity: id,
            degraded: false,
        });
        assert_eq!(metrics.degraded_assessments.get(), 1);
        assert_eq!(metrics.events.with_label_values(&["assessed"]).get(), 2);
    }
}
