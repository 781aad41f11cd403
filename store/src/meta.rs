//! Data-directory manifest.

use accredit_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// What a data directory records about itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreManifest {
    /// Layout version of the stored records and indexes.
    pub schema_version: u32,
    /// When the directory was first initialised.
    pub created_at: Timestamp,
    /// When the schema was last brought up to date.
    pub migrated_at: Timestamp,
}

impl StoreManifest {
    pub fn fresh(schema_version: u32, now: Timestamp) -> Self {
        Self {
            schema_version,
            created_at: now,
            migrated_at: now,
        }
    }
}

/// Storage for the manifest. Activity and certificate bookkeeping lives in
/// their own stores; this covers only the directory as a whole.
pub trait MetaStore {
    /// `None` for a directory that has never been initialised.
    fn manifest(&self) -> Result<Option<StoreManifest>, StoreError>;

    fn write_manifest(&self, manifest: &StoreManifest) -> Result<(), StoreError>;
}
