use accredit_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A compare-and-swap precondition did not hold.
    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Duplicate(_) | Self::Conflict(_) => ErrorKind::Conflict,
            Self::Backend(_) | Self::Serialization(_) | Self::Corruption(_) => ErrorKind::Storage,
        }
    }
}
