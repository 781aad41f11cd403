//! LMDB storage backend for the certification core.
//!
//! Implements all storage traits from `accredit-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single environment.

pub mod activity;
pub mod certificate;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;

pub use activity::LmdbActivityStore;
pub use certificate::LmdbCertificateStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
