//! Abstract storage traits for the certification core.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Two operations carry the concurrency guarantees of the system and must be
//! atomic in every backend:
//! - [`ActivityStore::update_activity`] is a compare-and-swap on the stored
//!   status and revision, serialising writes per activity.
//! - [`CertificateStore::append_certificate`] is a compare-and-swap on the
//!   chain tail that also persists the certificate and flips the activity to
//!   `certified`, all or nothing.

pub mod activity;
pub mod certificate;
pub mod error;
pub mod meta;

pub use activity::{check_current, ActivityFilter, ActivityStore};
pub use certificate::CertificateStore;
pub use error::StoreError;
pub use meta::{MetaStore, StoreManifest};
