//! Append-only, hash-chained certificate ledger.
//!
//! Every certificate commits to the content hash of the one before it, so
//! altering any minted record breaks every later link. There is one chain,
//! one trusted issuer, and no consensus.

pub mod chain;
pub mod error;
pub mod ledger;
pub mod mint;

pub use chain::{verify_chain, ChainIssue, ChainReport};
pub use error::LedgerError;
pub use ledger::{CertificateLedger, MAX_APPEND_ATTEMPTS};
pub use mint::{mint_certificate, recompute_hash};
