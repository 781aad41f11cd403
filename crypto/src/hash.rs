//! Blake2b hashing and the certificate content hash.

use accredit_types::{ActivityId, CertificateHash, Timestamp, UserId};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Domain separator prefixed to every certificate preimage.
const CERTIFICATE_DOMAIN: &[u8] = b"accredit/certificate/v1";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// The immutable fields a certificate's content hash covers.
///
/// Mutable bookkeeping (the verification counter) is deliberately absent.
pub struct CertificateFields<'a> {
    pub activity_id: &'a ActivityId,
    pub owner: &'a UserId,
    pub issuer: &'a UserId,
    pub issued_at: Timestamp,
    pub previous_hash: &'a CertificateHash,
    pub block_number: u64,
}

/// Compute the content hash of a certificate.
///
/// Variable-length fields are length-prefixed (u32 big-endian) and integers
/// are fixed-width big-endian, so distinct field tuples never share a preimage.
pub fn hash_certificate(fields: &CertificateFields<'_>) -> CertificateHash {
    let activity = fields.activity_id.as_str().as_bytes();
    let owner = fields.owner.as_str().as_bytes();
    let issuer = fields.issuer.as_str().as_bytes();
    let activity_len = (activity.len() as u32).to_be_bytes();
    let owner_len = (owner.len() as u32).to_be_bytes();
    let issuer_len = (issuer.len() as u32).to_be_bytes();
    let issued_at = fields.issued_at.as_secs().to_be_bytes();
    let block_number = fields.block_number.to_be_bytes();

    CertificateHash::new(blake2b_256_multi(&[
        CERTIFICATE_DOMAIN,
        &activity_len,
        activity,
        &owner_len,
        owner,
        &issuer_len,
        issuer,
        &issued_at,
        fields.previous_hash.as_bytes(),
        &block_number,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(
        activity_id: &'a ActivityId,
        owner: &'a UserId,
        issuer: &'a UserId,
        previous_hash: &'a CertificateHash,
    ) -> CertificateFields<'a> {
        CertificateFields {
            activity_id,
            owner,
            issuer,
            issued_at: Timestamp::new(1_000),
            previous_hash,
            block_number: 1,
        }
    }

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"hello");
        let h2 = blake2b_256(b"hello");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn certificate_hash_is_deterministic() {
        let a = ActivityId::new(2026, 1);
        let o = UserId::new("member").unwrap();
        let i = UserId::new("admin").unwrap();
        let p = CertificateHash::ZERO;
        assert_eq!(
            hash_certificate(&fields(&a, &o, &i, &p)),
            hash_certificate(&fields(&a, &o, &i, &p))
        );
        assert!(!hash_certificate(&fields(&a, &o, &i, &p)).is_zero());
    }

    #[test]
    fn every_field_changes_the_hash() {
        let a = ActivityId::new(2026, 1);
        let o = UserId::new("member").unwrap();
        let i = UserId::new("admin").unwrap();
        let p = CertificateHash::ZERO;
        let base = hash_certificate(&fields(&a, &o, &i, &p));

        let a2 = ActivityId::new(2026, 2);
        assert_ne!(base, hash_certificate(&fields(&a2, &o, &i, &p)));

        let o2 = UserId::new("member2").unwrap();
        assert_ne!(base, hash_certificate(&fields(&a, &o2, &i, &p)));

        let i2 = UserId::new("admin2").unwrap();
        assert_ne!(base, hash_certificate(&fields(&a, &o, &i2, &p)));

        let p2 = CertificateHash::new([1u8; 32]);
        assert_ne!(base, hash_certificate(&fields(&a, &o, &i, &p2)));

        let mut later = fields(&a, &o, &i, &p);
        later.issued_at = Timestamp::new(1_001);
        assert_ne!(base, hash_certificate(&later));

        let mut next_block = fields(&a, &o, &i, &p);
        next_block.block_number = 2;
        assert_ne!(base, hash_certificate(&next_block));
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        // "ab" + "c" must not collide with "a" + "bc".
        let a = ActivityId::new(2026, 1);
        let p = CertificateHash::ZERO;
        let o1 = UserId::new("ab").unwrap();
        let i1 = UserId::new("c").unwrap();
        let o2 = UserId::new("a").unwrap();
        let i2 = UserId::new("bc").unwrap();
        assert_ne!(
            hash_certificate(&fields(&a, &o1, &i1, &p)),
            hash_certificate(&fields(&a, &o2, &i2, &p))
        );
    }
}
