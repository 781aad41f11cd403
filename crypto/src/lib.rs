//! Cryptographic primitives for the certificate ledger.
//!
//! - **Blake2b-256** for all digests
//! - A canonical, length-prefixed encoding of a certificate's immutable
//!   fields, hashed to produce its content hash

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, hash_certificate, CertificateFields};
