use accredit_ledger::LedgerError;
use accredit_store::StoreError;
use accredit_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }
}
