//! LMDB implementation of CertificateStore.
//!
//! An append is a single LMDB write transaction. LMDB admits one writer at a
//! time, so reading the tail and writing the new block inside that
//! transaction is a true compare-and-swap.

use std::ops::Bound;

use accredit_store::{check_current, CertificateStore, StoreError};
use accredit_types::{
    Activity, ActivityId, ActivityStatus, Certificate, CertificateHash, ChainTail, Timestamp,
    VerificationStats,
};

use crate::activity::read_activity;
use crate::environment::{hash_from_bytes, u64_key, LmdbEnvironment, CHAIN_TAIL_KEY};
use crate::LmdbError;

pub struct LmdbCertificateStore {
    pub(crate) lmdb: LmdbEnvironment,
}

impl LmdbCertificateStore {
    fn read_certificate(
        &self,
        txn: &heed::RoTxn,
        hash: &CertificateHash,
    ) -> Result<Option<Certificate>, LmdbError> {
        match self.lmdb.certificates_db.get(txn, hash.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }
}

impl CertificateStore for LmdbCertificateStore {
    fn chain_tail(&self) -> Result<ChainTail, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        Ok(self.lmdb.read_tail(&rtxn)?)
    }

    fn append_certificate(
        &self,
        expected_tail: &ChainTail,
        certificate: &Certificate,
        activity: &Activity,
    ) -> Result<(), StoreError> {
        if certificate.previous_hash != expected_tail.head
            || certificate.block_number != expected_tail.next_block
        {
            return Err(StoreError::Conflict(format!(
                "certificate block {} does not extend the expected tail",
                certificate.block_number
            )));
        }
        if activity.id != certificate.activity_id || activity.status != ActivityStatus::Certified {
            return Err(StoreError::Conflict(format!(
                "activity {} is not certified by this certificate",
                activity.id
            )));
        }

        let mut wtxn = self.lmdb.env().write_txn().map_err(LmdbError::from)?;

        let tail = self.lmdb.read_tail(&wtxn)?;
        if &tail != expected_tail {
            return Err(StoreError::Conflict(format!(
                "chain tail moved to block {}",
                tail.next_block
            )));
        }
        if self
            .lmdb
            .by_activity_db
            .get(&wtxn, activity.id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "certificate for activity {}",
                activity.id
            )));
        }
        let stored = read_activity(&self.lmdb, &wtxn, &activity.id)?;
        check_current(&stored, ActivityStatus::Approved, activity.revision)?;

        let mut written = activity.clone();
        written.revision += 1;
        let cert_bytes = bincode::serialize(certificate).map_err(LmdbError::from)?;
        let activity_bytes = bincode::serialize(&written).map_err(LmdbError::from)?;
        let tail_bytes =
            bincode::serialize(&tail.advance(certificate)).map_err(LmdbError::from)?;
        let hash = certificate.hash.as_bytes();

        self.lmdb
            .certificates_db
            .put(&mut wtxn, hash, &cert_bytes)
            .map_err(LmdbError::from)?;
        self.lmdb
            .by_activity_db
            .put(&mut wtxn, activity.id.as_str().as_bytes(), hash)
            .map_err(LmdbError::from)?;
        self.lmdb
            .by_block_db
            .put(&mut wtxn, &u64_key(certificate.block_number), hash)
            .map_err(LmdbError::from)?;
        self.lmdb
            .activities_db
            .put(&mut wtxn, &u64_key(activity.id.sequence()), &activity_bytes)
            .map_err(LmdbError::from)?;
        self.lmdb
            .meta_db
            .put(&mut wtxn, CHAIN_TAIL_KEY, &tail_bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_certificate(&self, hash: &CertificateHash) -> Result<Option<Certificate>, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        Ok(self.read_certificate(&rtxn, hash)?)
    }

    fn certificate_for_activity(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Option<Certificate>, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        let hash = match self
            .lmdb
            .by_activity_db
            .get(&rtxn, activity_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => hash_from_bytes(bytes)?,
            None => return Ok(None),
        };
        let cert = self
            .read_certificate(&rtxn, &hash)?
            .ok_or_else(|| LmdbError::Corruption(format!("dangling index for {}", activity_id)))?;
        Ok(Some(cert))
    }

    fn certificate_at(&self, block_number: u64) -> Result<Option<Certificate>, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        let hash = match self
            .lmdb
            .by_block_db
            .get(&rtxn, &u64_key(block_number))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => hash_from_bytes(bytes)?,
            None => return Ok(None),
        };
        let cert = self.read_certificate(&rtxn, &hash)?.ok_or_else(|| {
            LmdbError::Corruption(format!("dangling index for block {}", block_number))
        })?;
        Ok(Some(cert))
    }

    fn certificates_from(
        &self,
        from_block: u64,
        limit: usize,
    ) -> Result<Vec<Certificate>, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        let start = u64_key(from_block);
        let bounds = (Bound::Included(&start[..]), Bound::Unbounded);
        let iter = self
            .lmdb
            .by_block_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter.take(limit) {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let hash = hash_from_bytes(val)?;
            let cert = self.read_certificate(&rtxn, &hash)?.ok_or_else(|| {
                LmdbError::Corruption(format!("dangling block index for {}", hash))
            })?;
            results.push(cert);
        }
        Ok(results)
    }

    fn verification_stats(&self, hash: &CertificateHash) -> Result<VerificationStats, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        match self
            .lmdb
            .verifications_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => Ok(VerificationStats::default()),
        }
    }

    fn record_verification(
        &self,
        hash: &CertificateHash,
        at: Timestamp,
    ) -> Result<VerificationStats, StoreError> {
        let mut wtxn = self.lmdb.env().write_txn().map_err(LmdbError::from)?;
        if self
            .lmdb
            .certificates_db
            .get(&wtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(StoreError::NotFound(format!("certificate {}", hash)));
        }
        let mut stats: VerificationStats = match self
            .lmdb
            .verifications_db
            .get(&wtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => bincode::deserialize(bytes).map_err(LmdbError::from)?,
            None => VerificationStats::default(),
        };
        stats.record(at);
        let bytes = bincode::serialize(&stats).map_err(LmdbError::from)?;
        self.lmdb
            .verifications_db
            .put(&mut wtxn, hash.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(stats)
    }
}
