//! Nullable store: thread-safe in-memory storage for testing.
//!
//! Every trait method runs under one mutex, which gives the same atomicity
//! the LMDB backend gets from its single-writer transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use accredit_store::{
    check_current, ActivityFilter, ActivityStore, CertificateStore, MetaStore, StoreError, StoreManifest,
};
use accredit_types::{
    Activity, ActivityId, ActivityStatus, Certificate, CertificateHash, ChainTail, Timestamp,
    VerificationStats,
};

#[derive(Default)]
struct Inner {
    activity_seq: u64,
    activities: BTreeMap<u64, Activity>,
    certificates: HashMap<CertificateHash, Certificate>,
    by_activity: HashMap<ActivityId, CertificateHash>,
    by_block: BTreeMap<u64, CertificateHash>,
    verifications: HashMap<CertificateHash, VerificationStats>,
    tail: ChainTail,
    manifest: Option<StoreManifest>,
}

/// An in-memory activity + certificate store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a stored certificate without touching the chain tail.
    /// Only for simulating tampering in integrity tests.
    pub fn tamper_certificate(&self, certificate: Certificate) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(hash) = inner.by_block.get(&certificate.block_number).copied() {
            inner.certificates.insert(hash, certificate);
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn stored<'a>(inner: &'a Inner, id: &ActivityId) -> Result<&'a Activity, StoreError> {
    inner
        .activities
        .get(&id.sequence())
        .filter(|a| &a.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("activity {}", id)))
}

impl ActivityStore for NullStore {
    fn create_activity(
        &self,
        year: i32,
        build: &dyn Fn(ActivityId) -> Activity,
    ) -> Result<Activity, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.activity_seq + 1;
        let activity = build(ActivityId::new(year, seq));
        if activity.id.sequence() != seq {
            return Err(StoreError::Conflict(format!(
                "activity built with foreign identity {}",
                activity.id
            )));
        }
        inner.activity_seq = seq;
        inner.activities.insert(seq, activity.clone());
        Ok(activity)
    }

    fn get_activity(&self, id: &ActivityId) -> Result<Activity, StoreError> {
        let inner = self.inner.lock().unwrap();
        stored(&inner, id).cloned()
    }

    fn update_activity(
        &self,
        expected: ActivityStatus,
        activity: &Activity,
    ) -> Result<Activity, StoreError> {
        if activity.status == ActivityStatus::Certified {
            return Err(StoreError::Conflict(format!(
                "activity {} can only be certified through the ledger",
                activity.id
            )));
        }
        self.check_writable()?;
        let mut inner = self.inner.lock().unwrap();
        check_current(stored(&inner, &activity.id)?, expected, activity.revision)?;
        let mut written = activity.clone();
        written.revision += 1;
        inner
            .activities
            .insert(written.id.sequence(), written.clone());
        Ok(written)
    }

    fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .activities
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    fn activity_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().unwrap().activities.len() as u64)
    }
}

impl CertificateStore for NullStore {
    fn chain_tail(&self) -> Result<ChainTail, StoreError> {
        Ok(self.inner.lock().unwrap().tail)
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
        self.check_writable()?;

        let mut inner = self.inner.lock().unwrap();
        if &inner.tail != expected_tail {
            return Err(StoreError::Conflict(format!(
                "chain tail moved to block {}",
                inner.tail.next_block
            )));
        }
        if inner.by_activity.contains_key(&activity.id) {
            return Err(StoreError::Duplicate(format!(
                "certificate for activity {}",
                activity.id
            )));
        }
        check_current(
            stored(&inner, &activity.id)?,
            ActivityStatus::Approved,
            activity.revision,
        )?;

        let hash = certificate.hash;
        let mut written = activity.clone();
        written.revision += 1;
        inner.certificates.insert(hash, certificate.clone());
        inner.by_activity.insert(activity.id.clone(), hash);
        inner.by_block.insert(certificate.block_number, hash);
        inner.activities.insert(written.id.sequence(), written);
        inner.tail = inner.tail.advance(certificate);
        Ok(())
    }

    fn get_certificate(&self, hash: &CertificateHash) -> Result<Option<Certificate>, StoreError> {
        Ok(self.inner.lock().unwrap().certificates.get(hash).cloned())
    }

    fn certificate_for_activity(
        &self,
        activity_id: &ActivityId,
    ) -> Result<Option<Certificate>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .by_activity
            .get(activity_id)
            .and_then(|h| inner.certificates.get(h))
            .cloned())
    }

    fn certificate_at(&self, block_number: u64) -> Result<Option<Certificate>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .by_block
            .get(&block_number)
            .and_then(|h| inner.certificates.get(h))
            .cloned())
    }

    fn certificates_from(
        &self,
        from_block: u64,
        limit: usize,
    ) -> Result<Vec<Certificate>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .by_block
            .range(from_block..)
            .take(limit)
            .filter_map(|(_, h)| inner.certificates.get(h).cloned())
            .collect())
    }

    fn verification_stats(&self, hash: &CertificateHash) -> Result<VerificationStats, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.verifications.get(hash).copied().unwrap_or_default())
    }

    fn record_verification(
        &self,
        hash: &CertificateHash,
        at: Timestamp,
    ) -> Result<VerificationStats, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.certificates.contains_key(hash) {
            return Err(StoreError::NotFound(format!("certificate {}", hash)));
        }
        let stats = inner.verifications.entry(*hash).or_default();
        stats.record(at);
        Ok(*stats)
    }
}

impl MetaStore for NullStore {
    fn manifest(&self) -> Result<Option<StoreManifest>, StoreError> {
        Ok(self.inner.lock().unwrap().manifest)
    }

    fn write_manifest(&self, manifest: &StoreManifest) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.lock().unwrap().manifest = Some(*manifest);
        Ok(())
    }
}
