//! The classification capability consumed by the gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ClassifierError;

/// A proof document handed over for classification.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A classifier reply before normalisation.
///
/// Field names follow the JSON contract the rubric prompt asks for. Anything
/// missing defaults so a partially filled reply still normalises.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAssessment {
    pub fraud_score: f64,
    pub verdict: String,
    pub concerns: Vec<String>,
    pub confidence: f64,
    pub recommendation: String,
}

/// An external capability that scores a proof artifact.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short identifier for logs (model or backend name).
    fn id(&self) -> &str;

    /// Score one artifact. May be slow; the gate enforces the deadline.
    async fn classify(&self, artifact: &Artifact) -> Result<RawAssessment, ClassifierError>;
}

/// A classifier that is switched off. Every call degrades.
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    fn id(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _artifact: &Artifact) -> Result<RawAssessment, ClassifierError> {
        Err(ClassifierError::Disabled)
    }
}
