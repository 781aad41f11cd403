//! Validation errors and the shared error taxonomy.

use thiserror::Error;

use crate::state::{Action, ActivityStatus};

/// Coarse classification every crate's error maps into.
///
/// The HTTP layer turns these into status codes; the workflow and ledger use
/// them to decide whether an operation is retry-safe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input. No state change.
    Validation,
    /// Wrong state for the requested transition, or a duplicate. No state change.
    Conflict,
    /// Role mismatch. No state change.
    Unauthorized,
    /// The target does not exist (or is not visible to the caller).
    NotFound,
    /// Storage failed; nothing partial was left visible, so retrying is safe.
    Storage,
}

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("activity can no longer be edited: it is {status}")]
    NotEditable { status: ActivityStatus },

    #[error("cannot {action} an activity that is {from}")]
    InvalidTransition { from: ActivityStatus, action: Action },
}

impl TypesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } | Self::NotEditable { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Validation,
        }
    }
}
