//! Map a raw classifier reply onto the closed advisory vocabulary.

use accredit_types::{FraudAssessment, Recommendation, Score, Timestamp, Verdict};

use crate::RawAssessment;

/// Concerns beyond this are dropped.
const MAX_CONCERNS: usize = 20;

/// Clamp scores into `0..=100` and map free-text labels onto the enums.
///
/// Unknown verdicts become `suspicious`; unknown recommendations become
/// `flag_for_review`. A classifier can never claim `manual_review_required`
/// for itself: that verdict is reserved for the degraded path.
pub fn normalize(raw: RawAssessment, assessed_at: Timestamp) -> FraudAssessment {
    let verdict = match raw.verdict.trim().to_ascii_lowercase().as_str() {
        "authentic" => Verdict::Authentic,
        "forged" => Verdict::Forged,
        _ => Verdict::Suspicious,
    };
    let recommendation = match raw.recommendation.trim().to_ascii_lowercase().as_str() {
        "auto_approve" => Recommendation::AutoApprove,
        "auto_reject" => Recommendation::AutoReject,
        _ => Recommendation::FlagForReview,
    };
    let concerns = raw
        .concerns
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .take(MAX_CONCERNS)
        .collect();

    FraudAssessment {
        fraud_score: Score::from_f64(raw.fraud_score),
        verdict,
        confidence: Score::from_f64(raw.confidence),
        concerns,
        recommendation,
        assessed_at,
    }
}
