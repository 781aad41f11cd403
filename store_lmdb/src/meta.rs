//! LMDB implementation of MetaStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use accredit_store::{MetaStore, StoreError, StoreManifest};

use crate::LmdbError;

const MANIFEST_KEY: &[u8] = b"manifest";

/// Shares the `meta` database with the activity sequence and chain tail,
/// under its own key.
pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl MetaStore for LmdbMetaStore {
    fn manifest(&self) -> Result<Option<StoreManifest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.meta_db.get(&rtxn, MANIFEST_KEY).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn write_manifest(&self, manifest: &StoreManifest) -> Result<(), StoreError> {
        let bytes = bincode::serialize(manifest).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.meta_db
            .put(&mut wtxn, MANIFEST_KEY, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
