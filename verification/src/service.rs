//! The verification service.

use std::sync::Arc;

use accredit_ledger::{CertificateLedger, ChainReport};
use accredit_store::{ActivityStore, CertificateStore, StoreError};
use accredit_types::{CertificateHash, Clock};

use crate::error::VerificationError;
use crate::outcome::{PublicCertificateView, VerificationOutcome};

pub struct VerificationService {
    activities: Arc<dyn ActivityStore + Send + Sync>,
    certificates: Arc<dyn CertificateStore + Send + Sync>,
    ledger: Arc<CertificateLedger>,
    clock: Arc<dyn Clock>,
}

impl VerificationService {
    pub fn new(
        activities: Arc<dyn ActivityStore + Send + Sync>,
        certificates: Arc<dyn CertificateStore + Send + Sync>,
        ledger: Arc<CertificateLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            certificates,
            ledger,
            clock,
        }
    }

    /// Resolve `raw` to a public view and bump the verification counter.
    ///
    /// Malformed input takes the same path as a well-formed miss: it is
    /// looked up as the genesis value, which no certificate carries.
    pub fn verify(&self, raw: &str) -> Result<VerificationOutcome, VerificationError> {
        let hash = CertificateHash::from_hex(raw.trim()).unwrap_or(CertificateHash::ZERO);

        let certificate = match self.certificates.get_certificate(&hash)? {
            Some(c) if !hash.is_zero() => c,
            _ => {
                tracing::info!("verification miss");
                return Ok(VerificationOutcome::not_verified());
            }
        };

        let activity = match self.activities.get_activity(&certificate.activity_id) {
            Ok(a) => a,
            Err(StoreError::NotFound(_)) => {
                tracing::warn!(
                    certificate = %certificate.id,
                    activity = %certificate.activity_id,
                    "certificate references a missing activity"
                );
                return Ok(VerificationOutcome::not_verified());
            }
            Err(e) => return Err(e.into()),
        };

        // The counter is bookkeeping only; losing an increment is acceptable.
        match self.certificates.record_verification(&hash, self.clock.now()) {
            Ok(stats) => {
                tracing::info!(certificate = %certificate.id, count = stats.count, "verification hit");
            }
            Err(e) => {
                tracing::warn!(certificate = %certificate.id, error = %e, "verification counter not updated");
            }
        }

        Ok(VerificationOutcome::verified(PublicCertificateView::new(
            &certificate,
            &activity,
        )))
    }

    /// Full chain integrity walk from block 1.
    pub fn check_chain(&self) -> Result<ChainReport, VerificationError> {
        Ok(self.ledger.verify_chain()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredit_nullables::{NullClock, NullStore};
    use accredit_types::{
        AchievementLevel, Action, Activity, ActivityForm, Category, Certificate, MemberRef,
        Timestamp, UserId,
    };
    use chrono::NaiveDate;

    // ---------------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------------

    /// 2026-03-01T00:00:00Z
    const NOW: u64 = 1_772_323_200;

    fn setup() -> (Arc<NullStore>, Arc<NullClock>, Arc<CertificateLedger>, VerificationService) {
        let store = Arc::new(NullStore::new());
        let clock = Arc::new(NullClock::new(NOW));
        let ledger = Arc::new(CertificateLedger::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let service = VerificationService::new(store.clone(), store.clone(), ledger.clone(), clock.clone());
        (store, clock, ledger, service)
    }

    fn certified(store: &NullStore, ledger: &CertificateLedger, owner: &str) -> Certificate {
        let owner = MemberRef {
            id: UserId::new(owner).unwrap(),
            display_name: "Asha Verma".into(),
        };
        let form = ActivityForm {
            title: "Hackathon winner".into(),
            description: "First place".into(),
            category: Category::Technical,
            level: AchievementLevel::National,
            organizing_body: None,
            event_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            duration_days: None,
            proof_documents: vec![],
            skills: vec!["Rust".into(), "Teamwork".into()],
        };
        let mut a = store
            .create_activity(2026, &|id| {
                Activity::create(id, owner.clone(), form.clone(), false, Timestamp::new(NOW))
            })
            .unwrap();
        let reviewer = UserId::new("faculty-1").unwrap();
        let prev = a
            .transition(Action::Approve, &reviewer, Some("verified certificate"), Timestamp::new(NOW))
            .unwrap();
        store.update_activity(prev, &a).unwrap();
        ledger.issue(&UserId::new("admin-1").unwrap(), &a.id).unwrap()
    }

    // ---------------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------------

    #[test]
    fn hit_returns_redacted_view_and_counts() {
        let (store, clock, ledger, service) = setup();
        let cert = certified(&store, &ledger, "student-a");
        clock.advance(60);

        let outcome = service.verify(&cert.hash.to_string()).unwrap();
        assert!(outcome.verified);
        let view = outcome.certificate.unwrap();
        assert_eq!(view.student, "Asha Verma");
        assert_eq!(view.activity, "Hackathon winner");
        assert_eq!(view.level, "National");
        assert_eq!(view.issued_at, "2026-03-01T00:00:00Z");
        assert_eq!(view.skills, vec!["Rust".to_string(), "Teamwork".to_string()]);

        let stats = store.verification_stats(&cert.hash).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.last_verified_at, Some(Timestamp::new(NOW + 60)));
    }

    #[test]
    fn uppercase_and_padded_hash_still_verifies() {
        let (store, _clock, ledger, service) = setup();
        let cert = certified(&store, &ledger, "student-a");
        let raw = format!("  {}  ", cert.hash.to_string().to_uppercase());
        assert!(service.verify(&raw).unwrap().verified);
    }

    #[test]
    fn misses_are_indistinguishable() {
        let (store, _clock, ledger, service) = setup();
        certified(&store, &ledger, "student-a");

        let malformed = service.verify("deadbeef").unwrap();
        let unissued = service.verify(&"ab".repeat(32)).unwrap();
        let genesis = service.verify(&"0".repeat(64)).unwrap();
        let empty = service.verify("").unwrap();

        assert!(!malformed.verified);
        assert_eq!(malformed, unissued);
        assert_eq!(malformed, genesis);
        assert_eq!(malformed, empty);
    }

    #[test]
    fn counter_failure_does_not_fail_lookup() {
        let (store, _clock, ledger, service) = setup();
        let cert = certified(&store, &ledger, "student-a");

        store.set_fail_writes(true);
        let outcome = service.verify(&cert.hash.to_string()).unwrap();
        assert!(outcome.verified);
        store.set_fail_writes(false);
        assert_eq!(store.verification_stats(&cert.hash).unwrap().count, 0);
    }

    #[test]
    fn verification_leaves_the_chain_intact() {
        let (store, _clock, ledger, service) = setup();
        let c1 = certified(&store, &ledger, "student-a");
        certified(&store, &ledger, "student-b");
        for _ in 0..3 {
            service.verify(&c1.hash.to_string()).unwrap();
        }
        let report = service.check_chain().unwrap();
        assert!(report.is_intact());
        assert_eq!(report.length, 2);
    }
}
