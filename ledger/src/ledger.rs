//! The certificate ledger: the single writer of the chain.

use std::sync::{Arc, Mutex};

use accredit_store::{ActivityStore, CertificateStore, StoreError};
use accredit_types::{
    Activity, ActivityId, ActivityStatus, Certificate, CertificateHash, ChainTail, Clock, UserId,
};

use crate::chain::{verify_chain, ChainReport};
use crate::mint::mint_certificate;
use crate::LedgerError;

/// Appends that lose the tail race to another process before giving up.
/// Within one process the tail lock already serialises issuance.
pub const MAX_APPEND_ATTEMPTS: u32 = 8;

/// Mints certificates for approved activities onto a single global chain.
///
/// Issuance is serialised by an in-process lock held only around the
/// read-tail-then-append step. The store's compare-and-swap on the tail
/// backs that lock up against writers in other processes.
pub struct CertificateLedger {
    activities: Arc<dyn ActivityStore + Send + Sync>,
    certificates: Arc<dyn CertificateStore + Send + Sync>,
    clock: Arc<dyn Clock>,
    tail_lock: Mutex<()>,
}

impl CertificateLedger {
    pub fn new(
        activities: Arc<dyn ActivityStore + Send + Sync>,
        certificates: Arc<dyn CertificateStore + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            certificates,
            clock,
            tail_lock: Mutex::new(()),
        }
    }

    /// Certify `activity_id` on behalf of `issuer`.
    ///
    /// On success the certificate is on the chain and the activity is
    /// `certified`, both from the same atomic write. On any error neither
    /// happened.
    pub fn issue(&self, issuer: &UserId, activity_id: &ActivityId) -> Result<Certificate, LedgerError> {
        let mut activity = self.activities.get_activity(activity_id)?;
        self.check_issuable(&activity)?;

        let _guard = self
            .tail_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for attempt in 1..=MAX_APPEND_ATTEMPTS {
            let tail = self.certificates.chain_tail()?;
            let certificate = mint_certificate(&tail, &activity, issuer, self.clock.now());
            let mut certified = activity.clone();
            certified.mark_certified(&certificate)?;

            match self
                .certificates
                .append_certificate(&tail, &certificate, &certified)
            {
                Ok(()) => {
                    tracing::info!(
                        activity = %activity_id,
                        certificate = %certificate.id,
                        block = certificate.block_number,
                        hash = %certificate.hash,
                        issuer = %issuer,
                        "certificate issued"
                    );
                    return Ok(certificate);
                }
                Err(StoreError::Duplicate(_)) => {
                    return Err(LedgerError::AlreadyCertified(activity_id.clone()));
                }
                Err(StoreError::Conflict(reason)) => {
                    tracing::debug!(activity = %activity_id, attempt, %reason, "append lost a race");
                    activity = self.activities.get_activity(activity_id)?;
                    self.check_issuable(&activity)?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::Contended {
            attempts: MAX_APPEND_ATTEMPTS,
        })
    }

    fn check_issuable(&self, activity: &Activity) -> Result<(), LedgerError> {
        if activity.status == ActivityStatus::Certified
            || self.certificates.certificate_for_activity(&activity.id)?.is_some()
        {
            return Err(LedgerError::AlreadyCertified(activity.id.clone()));
        }
        if activity.status != ActivityStatus::Approved {
            return Err(LedgerError::NotApproved {
                id: activity.id.clone(),
                status: activity.status,
            });
        }
        Ok(())
    }

    pub fn chain_tail(&self) -> Result<ChainTail, LedgerError> {
        Ok(self.certificates.chain_tail()?)
    }

    pub fn certificate(&self, hash: &CertificateHash) -> Result<Option<Certificate>, LedgerError> {
        Ok(self.certificates.get_certificate(hash)?)
    }

    pub fn certificate_for(&self, activity_id: &ActivityId) -> Result<Option<Certificate>, LedgerError> {
        Ok(self.certificates.certificate_for_activity(activity_id)?)
    }

    /// Every certificate in ascending block order.
    pub fn certificates(&self) -> Result<Vec<Certificate>, LedgerError> {
        Ok(self.certificates.iter_certificates()?)
    }

    /// Walk the whole chain from genesis and report every defect.
    pub fn verify_chain(&self) -> Result<ChainReport, LedgerError> {
        let tail = self.certificates.chain_tail()?;
        let chain = self.certificates.iter_certificates()?;
        let mut lookup_error = None;
        let report = verify_chain(&chain, &tail, |activity_id, hash| {
            match self.activities.get_activity(activity_id) {
                Ok(a) => a
                    .certification
                    .as_ref()
                    .is_some_and(|c| &c.certificate_hash == hash),
                Err(StoreError::NotFound(_)) => false,
                Err(e) => {
                    lookup_error.get_or_insert(e);
                    true
                }
            }
        });
        if let Some(e) = lookup_error {
            return Err(e.into());
        }
        tracing::info!(
            length = report.length,
            issues = report.issues.len(),
            "chain integrity walk complete"
        );
        Ok(report)
    }
}
