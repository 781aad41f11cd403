//! HTTP API for the certification service.
//!
//! Provides endpoints for:
//! - Activity submission, editing and listings (members)
//! - Review decisions (reviewers)
//! - Fraud assessment of proof artifacts (owners and reviewers)
//! - Certificate issuance and the chain integrity report (issuers)
//! - Public certificate verification
//! - Health and Prometheus metrics

pub mod auth;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use auth::Authenticated;
pub use envelope::Envelope;
pub use error::{ApiError, ErrorResponse};
pub use metrics::ApiMetrics;
pub use server::{router, AppState, RpcServer};
