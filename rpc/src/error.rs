//! API error types and their HTTP mapping.

use accredit_ledger::LedgerError;
use accredit_types::ErrorKind;
use accredit_verification::VerificationError;
use accredit_workflow::WorkflowError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::Envelope;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid identity headers: {0}")]
    Unauthenticated(String),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthorized,
            Self::BadRequest(_) => ErrorKind::Validation,
            Self::Workflow(e) => e.kind(),
            Self::Verification(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Internal(_) => ErrorKind::Storage,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Storage => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    /// Message safe to show in every environment. Storage detail never
    /// leaves the process unless error exposure is on.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Storage => "Service temporarily unavailable, please retry".to_string(),
            _ => self.to_string(),
        }
    }
}

/// An [`ApiError`] bound to the environment's exposure policy.
#[derive(Debug)]
pub struct ErrorResponse {
    pub error: ApiError,
    pub expose: bool,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self.error, "request failed");
        } else {
            tracing::debug!(error = %self.error, status = status.as_u16(), "request rejected");
        }
        let detail = self.expose.then(|| self.error.to_string());
        let body = Envelope::failure(self.error.public_message(), detail);
        (status, body).into_response()
    }
}
