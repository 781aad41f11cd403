//! Public certificate verification.
//!
//! Anyone holding a certificate hash can resolve it to a redacted public
//! view. A miss looks the same whether the hash was malformed, never issued,
//! or simply wrong, so the service offers no oracle for probing the chain.
//!
//! The deeper chain integrity walk is a separate operation and is never run
//! on the lookup path.

pub mod error;
pub mod outcome;
pub mod service;

pub use error::VerificationError;
pub use outcome::{PublicCertificateView, VerificationOutcome};
pub use service::VerificationService;
