//! Wire shape of a verification lookup.

use accredit_types::{Activity, Certificate};
use serde::{Deserialize, Serialize};

pub const VERIFIED_MESSAGE: &str = "Certificate verified successfully";
pub const NOT_VERIFIED_MESSAGE: &str = "Certificate not found or invalid";

/// What the public may see about a certificate.
///
/// Reviewer identities, fraud advice, proof documents and chain linkage
/// never appear here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCertificateView {
    pub student: String,
    pub activity: String,
    pub level: String,
    pub issued_at: String,
    pub skills: Vec<String>,
}

impl PublicCertificateView {
    pub fn new(certificate: &Certificate, activity: &Activity) -> Self {
        Self {
            student: activity.owner.display_name.clone(),
            activity: activity.title.clone(),
            level: activity.level.to_string(),
            issued_at: certificate.issued_at.to_rfc3339(),
            skills: activity.skills.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PublicCertificateView>,
    pub message: String,
}

impl VerificationOutcome {
    pub fn verified(view: PublicCertificateView) -> Self {
        Self {
            verified: true,
            certificate: Some(view),
            message: VERIFIED_MESSAGE.to_string(),
        }
    }

    pub fn not_verified() -> Self {
        Self {
            verified: false,
            certificate: None,
            message: NOT_VERIFIED_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_has_no_certificate_field() {
        let json = serde_json::to_value(VerificationOutcome::not_verified()).unwrap();
        assert_eq!(json["verified"], false);
        assert!(json.get("certificate").is_none());
        assert_eq!(json["message"], NOT_VERIFIED_MESSAGE);
    }

    #[test]
    fn view_uses_camel_case() {
        let view = PublicCertificateView {
            student: "Asha".into(),
            activity: "Hackathon winner".into(),
            level: "National".into(),
            issued_at: "2026-03-01T00:00:00Z".into(),
            skills: vec!["Rust".into()],
        };
        let json = serde_json::to_value(VerificationOutcome::verified(view)).unwrap();
        assert_eq!(json["certificate"]["issuedAt"], "2026-03-01T00:00:00Z");
        assert_eq!(json["certificate"]["student"], "Asha");
    }
}
