//! Chain integrity walk.

use serde::Serialize;

use accredit_types::{ActivityId, Certificate, CertificateHash, ChainTail};

use crate::mint::recompute_hash;

/// One defect found while walking the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainIssue {
    /// Block numbers are not contiguous from 1.
    Gap { expected: u64, found: u64 },
    /// `previous_hash` does not equal the prior certificate's hash.
    BrokenLink {
        block: u64,
        expected: CertificateHash,
        found: CertificateHash,
    },
    /// The stored hash does not match the certificate's own fields.
    HashMismatch { block: u64 },
    /// The certified activity does not point back at this certificate.
    UnlinkedActivity { block: u64, activity: ActivityId },
    /// The persisted tail disagrees with the last stored certificate.
    TailMismatch { tail_next_block: u64, chain_next_block: u64 },
}

/// Outcome of [`verify_chain`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub length: u64,
    pub head: CertificateHash,
    pub issues: Vec<ChainIssue>,
}

impl ChainReport {
    pub fn is_intact(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Walk `certificates` (ascending block order) from genesis and report
/// every defect. `linked` answers whether an activity's certification
/// back-reference names the given hash.
pub fn verify_chain<F>(certificates: &[Certificate], tail: &ChainTail, mut linked: F) -> ChainReport
where
    F: FnMut(&ActivityId, &CertificateHash) -> bool,
{
    let mut issues = Vec::new();
    let mut expected = ChainTail::genesis();

    for cert in certificates {
        if cert.block_number != expected.next_block {
            issues.push(ChainIssue::Gap {
                expected: expected.next_block,
                found: cert.block_number,
            });
        }
        if cert.previous_hash != expected.head {
            issues.push(ChainIssue::BrokenLink {
                block: cert.block_number,
                expected: expected.head,
                found: cert.previous_hash,
            });
        }
        if recompute_hash(cert) != cert.hash {
            issues.push(ChainIssue::HashMismatch {
                block: cert.block_number,
            });
        }
        if !linked(&cert.activity_id, &cert.hash) {
            issues.push(ChainIssue::UnlinkedActivity {
                block: cert.block_number,
                activity: cert.activity_id.clone(),
            });
        }
        expected = expected.advance(cert);
    }

    if expected != *tail {
        issues.push(ChainIssue::TailMismatch {
            tail_next_block: tail.next_block,
            chain_next_block: expected.next_block,
        });
    }

    ChainReport {
        length: certificates.len() as u64,
        head: expected.head,
        issues,
    }
}
