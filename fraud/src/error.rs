use thiserror::Error;

/// Why a classifier produced no usable verdict.
///
/// Never surfaced to workflow callers: the gate folds every variant into a
/// degraded assessment.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier is disabled")]
    Disabled,

    #[error("classifier timed out after {0} ms")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed classifier reply: {0}")]
    Malformed(String),

    #[error("empty artifact")]
    EmptyArtifact,
}
