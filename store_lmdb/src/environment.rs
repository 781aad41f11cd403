//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};

use accredit_types::ChainTail;

use crate::activity::LmdbActivityStore;
use crate::certificate::LmdbCertificateStore;
use crate::meta::LmdbMetaStore;
use crate::LmdbError;

/// Number of named databases opened by [`LmdbEnvironment::open`].
pub const DATABASE_COUNT: u32 = 6;

pub(crate) const ACTIVITY_SEQ_KEY: &[u8] = b"activity_seq";
pub(crate) const CHAIN_TAIL_KEY: &[u8] = b"chain_tail";

/// Wraps the LMDB environment and all database handles.
///
/// Layout:
/// - `activities`: activity sequence (u64 BE) -> bincode `Activity`
/// - `certificates`: content hash -> bincode `Certificate`
/// - `certificate_by_activity`: activity id -> content hash
/// - `certificate_by_block`: block number (u64 BE) -> content hash
/// - `verifications`: content hash -> bincode `VerificationStats`
/// - `meta`: manifest, activity sequence, chain tail
#[derive(Clone)]
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) activities_db: Database<Bytes, Bytes>,
    pub(crate) certificates_db: Database<Bytes, Bytes>,
    pub(crate) by_activity_db: Database<Bytes, Bytes>,
    pub(crate) by_block_db: Database<Bytes, Bytes>,
    pub(crate) verifications_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {}", path.display(), e)))?;

        // SAFETY: the environment is opened once per process and path; heed
        // requires the caller to guarantee no other handle maps the same file.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs.max(DATABASE_COUNT))
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let activities_db = env.create_database(&mut wtxn, Some("activities"))?;
        let certificates_db = env.create_database(&mut wtxn, Some("certificates"))?;
        let by_activity_db = env.create_database(&mut wtxn, Some("certificate_by_activity"))?;
        let by_block_db = env.create_database(&mut wtxn, Some("certificate_by_block"))?;
        let verifications_db = env.create_database(&mut wtxn, Some("verifications"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "LMDB environment opened");

        Ok(Self {
            env: Arc::new(env),
            activities_db,
            certificates_db,
            by_activity_db,
            by_block_db,
            verifications_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn activity_store(&self) -> LmdbActivityStore {
        LmdbActivityStore { lmdb: self.clone() }
    }

    pub fn certificate_store(&self) -> LmdbCertificateStore {
        LmdbCertificateStore { lmdb: self.clone() }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: self.env.clone(),
            meta_db: self.meta_db,
        }
    }

    /// Read the persisted chain tail within an open transaction.
    pub(crate) fn read_tail(&self, txn: &RoTxn) -> Result<ChainTail, LmdbError> {
        match self.meta_db.get(txn, CHAIN_TAIL_KEY)? {
            Some(bytes) => Ok(bincode::deserialize(bytes)?),
            None => Ok(ChainTail::genesis()),
        }
    }
}

/// Big-endian `u64` key so LMDB's byte order matches numeric order.
pub(crate) fn u64_key(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

pub(crate) fn hash_from_bytes(bytes: &[u8]) -> Result<accredit_types::CertificateHash, LmdbError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("index value of {} bytes", bytes.len())))?;
    Ok(accredit_types::CertificateHash::new(arr))
}
