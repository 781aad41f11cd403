//! Schema versioning for the data directory.
//!
//! The manifest records the layout version a directory was written with.
//! Opening a directory stamps fresh ones, upgrades older ones step by step,
//! and refuses ones written by a newer release.

use std::cmp::Ordering;

use accredit_store::{MetaStore, StoreError, StoreManifest};
use accredit_types::Timestamp;

use crate::LmdbError;

/// Layout version this build reads and writes.
///
/// Version 1: activities keyed by sequence and carrying a write revision,
/// certificates keyed by content
/// hash with activity and block indexes, verification counters kept apart
/// from the hashed certificate record.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub struct Migrator;

impl Migrator {
    /// Bring the directory to [`CURRENT_SCHEMA_VERSION`] and return its manifest.
    pub fn run(meta_store: &impl MetaStore, now: Timestamp) -> Result<StoreManifest, LmdbError> {
        let Some(mut manifest) = meta_store.manifest().map_err(store_failure)? else {
            let manifest = StoreManifest::fresh(CURRENT_SCHEMA_VERSION, now);
            meta_store.write_manifest(&manifest).map_err(store_failure)?;
            tracing::info!(version = CURRENT_SCHEMA_VERSION, "initialised data directory");
            return Ok(manifest);
        };

        match manifest.schema_version.cmp(&CURRENT_SCHEMA_VERSION) {
            Ordering::Equal => {
                tracing::debug!(version = manifest.schema_version, "schema up to date");
                Ok(manifest)
            }
            Ordering::Greater => Err(LmdbError::Corruption(format!(
                "data directory uses schema {}, this build supports up to {}",
                manifest.schema_version, CURRENT_SCHEMA_VERSION
            ))),
            Ordering::Less => {
                for from in manifest.schema_version..CURRENT_SCHEMA_VERSION {
                    tracing::info!(from, to = from + 1, "upgrading schema");
                    upgrade(from)?;
                }
                manifest.schema_version = CURRENT_SCHEMA_VERSION;
                manifest.migrated_at = now;
                meta_store.write_manifest(&manifest).map_err(store_failure)?;
                Ok(manifest)
            }
        }
    }
}

/// One upgrade step starting at `from`.
fn upgrade(from: u32) -> Result<(), LmdbError> {
    // Version 1 is the first layout; there is nothing older to convert.
    Err(LmdbError::Corruption(format!(
        "no upgrade path from schema {}",
        from
    )))
}

fn store_failure(e: StoreError) -> LmdbError {
    match e {
        StoreError::Serialization(m) | StoreError::Corruption(m) => LmdbError::Corruption(m),
        other => LmdbError::Heed(other.to_string()),
    }
}
