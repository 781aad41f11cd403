use accredit_ledger::LedgerError;
use accredit_store::StoreError;
use accredit_types::{ActivityId, ErrorKind, Role, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{role} may not {operation}")]
    Unauthorized { role: Role, operation: &'static str },

    #[error("activity {0} not found")]
    NotFound(ActivityId),

    #[error(transparent)]
    Invalid(#[from] TypesError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Invalid(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Storage(e) => e.kind(),
        }
    }
}
