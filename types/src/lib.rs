//! Fundamental types for the achievement certification system.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identities, certificate hashes, timestamps, closed enumerations, the activity
//! state machine, and the activity / certificate records themselves.

pub mod activity;
pub mod category;
pub mod certificate;
pub mod error;
pub mod fraud;
pub mod hash;
pub mod ids;
pub mod role;
pub mod state;
pub mod time;

pub use activity::{
    Activity, ActivityForm, ActivityUpdate, CertificationRecord, MemberRef, ProofDocument, Review,
};
pub use category::{AchievementLevel, Category};
pub use certificate::{Certificate, ChainTail, VerificationStats};
pub use error::{ErrorKind, TypesError};
pub use fraud::{FraudAssessment, Recommendation, Score, Verdict};
pub use hash::CertificateHash;
pub use ids::{ActivityId, CertificateId, UserId};
pub use role::Role;
pub use state::{Action, ActivityStatus, Requirement};
pub use time::{Clock, SystemClock, Timestamp};
