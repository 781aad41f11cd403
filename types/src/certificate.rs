//! Certificate records and the chain tail.

use serde::{Deserialize, Serialize};

use crate::hash::CertificateHash;
use crate::ids::{ActivityId, CertificateId, UserId};
use crate::time::Timestamp;

/// An immutable, chain-linked certificate.
///
/// Every field is covered by `hash` except `hash` itself. Mutable
/// verification bookkeeping lives in [`VerificationStats`], stored apart from
/// this record, so a lookup never rewrites a minted certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub activity_id: ActivityId,
    pub owner: UserId,
    pub issuer: UserId,
    pub issued_at: Timestamp,
    /// Content hash of certificate `block_number - 1`, or [`CertificateHash::ZERO`].
    pub previous_hash: CertificateHash,
    /// 1-based, contiguous position in the chain.
    pub block_number: u64,
    pub hash: CertificateHash,
}

/// Verification counter for a certificate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub count: u64,
    pub last_verified_at: Option<Timestamp>,
}

impl VerificationStats {
    pub fn record(&mut self, at: Timestamp) {
        self.count = self.count.saturating_add(1);
        self.last_verified_at = Some(at);
    }
}

/// The append point of the chain: head hash plus the next block number.
///
/// Persisted as a single versioned record; the block number doubles as the
/// version for compare-and-swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTail {
    pub head: CertificateHash,
    pub next_block: u64,
}

impl ChainTail {
    /// The tail of an empty chain.
    pub fn genesis() -> Self {
        Self {
            head: CertificateHash::ZERO,
            next_block: 1,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.next_block == 1
    }

    /// Number of certificates appended so far.
    pub fn length(&self) -> u64 {
        self.next_block - 1
    }

    /// The tail after appending `certificate`.
    pub fn advance(&self, certificate: &Certificate) -> Self {
        Self {
            head: certificate.hash,
            next_block: certificate.block_number + 1,
        }
    }
}

impl Default for ChainTail {
    fn default() -> Self {
        Self::genesis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_tail() {
        let tail = ChainTail::genesis();
        assert!(tail.is_genesis());
        assert_eq!(tail.length(), 0);
        assert!(tail.head.is_zero());
    }

    #[test]
    fn stats_record() {
        let mut stats = VerificationStats::default();
        stats.record(Timestamp::new(10));
        stats.record(Timestamp::new(20));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.last_verified_at, Some(Timestamp::new(20)));
    }
}
