use accredit_store::StoreError;
use accredit_types::{ActivityId, ActivityStatus, ErrorKind, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("activity {id} is {status}, only approved activities can be certified")]
    NotApproved { id: ActivityId, status: ActivityStatus },

    #[error("activity {0} already has a certificate")]
    AlreadyCertified(ActivityId),

    #[error("chain tail kept moving after {attempts} append attempts")]
    Contended { attempts: u32 },

    #[error(transparent)]
    Invalid(#[from] TypesError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotApproved { .. } | Self::AlreadyCertified(_) | Self::Contended { .. } => {
                ErrorKind::Conflict
            }
            Self::Invalid(e) => e.kind(),
            Self::Storage(e) => e.kind(),
        }
    }
}
