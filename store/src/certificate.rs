//! Certificate chain storage trait.

use crate::StoreError;
use accredit_types::{
    Activity, ActivityId, Certificate, CertificateHash, ChainTail, Timestamp, VerificationStats,
};

/// Trait for the append-only certificate chain.
///
/// Certificates are written once and never rewritten. The only mutable state
/// is the chain tail (advanced by appends) and per-certificate
/// [`VerificationStats`], kept apart from the certificate records.
pub trait CertificateStore {
    /// Current append point. [`ChainTail::genesis`] for an empty chain.
    fn chain_tail(&self) -> Result<ChainTail, StoreError>;

    /// Append `certificate` and persist `activity` (already flipped to
    /// `certified`) in a single atomic write.
    ///
    /// Preconditions, checked inside the same write:
    /// - the stored tail equals `expected_tail`, and `certificate` extends it
    ///   (`previous_hash == head`, `block_number == next_block`);
    /// - no certificate exists for the activity ([`StoreError::Duplicate`]);
    /// - the stored activity is still `approved` at `activity.revision`
    ///   ([`StoreError::Conflict`]), so an assessment or other write that
    ///   landed after `activity` was read is never overwritten.
    ///
    /// The activity is written with its revision advanced. On any failure
    /// nothing is written.
    fn append_certificate(
        &self,
        expected_tail: &ChainTail,
        certificate: &Certificate,
        activity: &Activity,
    ) -> Result<(), StoreError>;

    /// Look up a certificate by content hash.
    fn get_certificate(&self, hash: &CertificateHash) -> Result<Option<Certificate>, StoreError>;

    /// The certificate minted for an activity, if any.
    fn certificate_for_activity(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Option<Certificate>, StoreError>;

    /// The certificate at a chain position, if any.
    fn certificate_at(&self, block_number: u64) -> Result<Option<Certificate>, StoreError>;

    /// Certificates in ascending block order, starting at `from_block`, at
    /// most `limit` of them.
    fn certificates_from(
        &self,
        from_block: u64,
        limit: usize,
    ) -> Result<Vec<Certificate>, StoreError>;

    /// Every certificate in ascending block order.
    fn iter_certificates(&self) -> Result<Vec<Certificate>, StoreError> {
        self.certificates_from(1, usize::MAX)
    }

    /// Number of certificates in the chain.
    fn certificate_count(&self) -> Result<u64, StoreError> {
        Ok(self.chain_tail()?.length())
    }

    /// Verification bookkeeping for a certificate (zeroed if never verified).
    fn verification_stats(&self, hash: &CertificateHash) -> Result<VerificationStats, StoreError>;

    /// Count one successful verification lookup.
    fn record_verification(
        &self,
        hash: &CertificateHash,
        at: Timestamp,
    ) -> Result<VerificationStats, StoreError>;
}
