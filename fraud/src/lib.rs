//! Fraud Advisory Gate.
//!
//! A proof artifact is handed to an external [`Classifier`] and its reply is
//! normalised into a bounded [`FraudAssessment`](accredit_types::FraudAssessment).
//! The [`FraudGate`] bounds every call with a timeout and converts any
//! failure into a degraded `manual_review_required` assessment, so callers
//! always receive something to show a human reviewer.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod http;
pub mod normalize;

pub use classifier::{Artifact, Classifier, DisabledClassifier, RawAssessment};
pub use error::ClassifierError;
pub use gate::FraudGate;
pub use http::{HttpClassifier, HttpClassifierConfig};
pub use normalize::normalize;
