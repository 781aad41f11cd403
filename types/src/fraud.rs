//! Fraud advisory result attached to an activity for audit.
//!
//! Advisory only: nothing in the workflow branches on the recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Timestamp;

/// A percentage clamped to `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    /// Clamp any integer into range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    /// Clamp and round a float; NaN becomes 0.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(0);
        }
        Self(value.round().clamp(0.0, Self::MAX as f64) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Authentic,
    Suspicious,
    Forged,
    /// The classifier could not be consulted; a human must decide.
    ManualReviewRequired,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentic => "authentic",
            Self::Suspicious => "suspicious",
            Self::Forged => "forged",
            Self::ManualReviewRequired => "manual_review_required",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    AutoApprove,
    FlagForReview,
    AutoReject,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApprove => "auto_approve",
            Self::FlagForReview => "flag_for_review",
            Self::AutoReject => "auto_reject",
        }
    }
}

/// Normalised classifier output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Higher is more suspicious.
    pub fraud_score: Score,
    pub verdict: Verdict,
    pub confidence: Score,
    pub concerns: Vec<String>,
    pub recommendation: Recommendation,
    pub assessed_at: Timestamp,
}

impl FraudAssessment {
    /// Score reported when the classifier could not produce a verdict.
    pub const DEGRADED_SCORE: i64 = 50;

    /// The fallback used when classification itself failed.
    pub fn degraded(reason: impl Into<String>, assessed_at: Timestamp) -> Self {
        Self {
            fraud_score: Score::new(Self::DEGRADED_SCORE),
            verdict: Verdict::ManualReviewRequired,
            confidence: Score::new(0),
            concerns: vec![reason.into()],
            recommendation: Recommendation::FlagForReview,
            assessed_at,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.verdict == Verdict::ManualReviewRequired
    }
}
