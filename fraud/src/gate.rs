//! The timeout-bounded advisory gate.

use std::sync::Arc;
use std::time::Duration;

use accredit_types::{Clock, FraudAssessment};

use crate::normalize::normalize;
use crate::{Artifact, Classifier, ClassifierError};

/// Default deadline for one classification.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Consults a [`Classifier`] and always yields an assessment.
///
/// Failure of any kind (timeout, transport, malformed reply) becomes
/// [`FraudAssessment::degraded`] with the reason as its only concern. The
/// in-flight classifier future is dropped on timeout.
pub struct FraudGate {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl FraudGate {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier,
            timeout,
            clock,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn assess(&self, artifact: &Artifact) -> FraudAssessment {
        let outcome = match tokio::time::timeout(self.timeout, self.classifier.classify(artifact)).await
        {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout.as_millis() as u64)),
        };
        let now = self.clock.now();

        match outcome {
            Ok(raw) => {
                let assessment = normalize(raw, now);
                tracing::debug!(
                    classifier = self.classifier.id(),
                    score = assessment.fraud_score.get(),
                    verdict = assessment.verdict.as_str(),
                    "fraud assessment produced"
                );
                assessment
            }
            Err(e) => {
                tracing::warn!(
                    classifier = self.classifier.id(),
                    error = %e,
                    "fraud classifier unavailable, degrading to manual review"
                );
                FraudAssessment::degraded(e.to_string(), now)
            }
        }
    }
}
