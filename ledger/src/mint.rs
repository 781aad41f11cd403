//! Building a certificate on top of a chain tail.

use accredit_crypto::{hash_certificate, CertificateFields};
use accredit_types::{Activity, Certificate, CertificateHash, CertificateId, ChainTail, Timestamp, UserId};

/// Mint the certificate that would extend `tail` for `activity`.
///
/// Pure: nothing is persisted. The content hash covers every field except
/// itself.
pub fn mint_certificate(
    tail: &ChainTail,
    activity: &Activity,
    issuer: &UserId,
    issued_at: Timestamp,
) -> Certificate {
    let hash = hash_certificate(&CertificateFields {
        activity_id: &activity.id,
        owner: &activity.owner.id,
        issuer,
        issued_at,
        previous_hash: &tail.head,
        block_number: tail.next_block,
    });
    Certificate {
        id: CertificateId::new(issued_at.year(), tail.next_block),
        activity_id: activity.id.clone(),
        owner: activity.owner.id.clone(),
        issuer: issuer.clone(),
        issued_at,
        previous_hash: tail.head,
        block_number: tail.next_block,
        hash,
    }
}

/// Recompute a stored certificate's content hash from its own fields.
pub fn recompute_hash(certificate: &Certificate) -> CertificateHash {
    hash_certificate(&CertificateFields {
        activity_id: &certificate.activity_id,
        owner: &certificate.owner,
        issuer: &certificate.issuer,
        issued_at: certificate.issued_at,
        previous_hash: &certificate.previous_hash,
        block_number: certificate.block_number,
    })
}
