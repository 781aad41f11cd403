//! LMDB implementation of ActivityStore.
//!
//! Activities are keyed by their global sequence number (u64 big-endian), so
//! a forward scan yields identity order. The sequence counter lives in the
//! meta database and is advanced in the same transaction as the insert.

use accredit_store::{check_current, ActivityFilter, ActivityStore, StoreError};
use accredit_types::{Activity, ActivityId, ActivityStatus};

use crate::environment::{u64_key, LmdbEnvironment, ACTIVITY_SEQ_KEY};
use crate::LmdbError;

pub struct LmdbActivityStore {
    pub(crate) lmdb: LmdbEnvironment,
}

pub(crate) fn read_activity(
    lmdb: &LmdbEnvironment,
    txn: &heed::RoTxn,
    id: &ActivityId,
) -> Result<Activity, LmdbError> {
    let not_found = || LmdbError::NotFound(format!("activity {}", id));
    let bytes = lmdb
        .activities_db
        .get(txn, &u64_key(id.sequence()))?
        .ok_or_else(not_found)?;
    let activity: Activity = bincode::deserialize(bytes)?;
    // The sequence is global; a mismatched year prefix names nothing.
    if &activity.id != id {
        return Err(not_found());
    }
    Ok(activity)
}

impl ActivityStore for LmdbActivityStore {
    fn create_activity(
        &self,
        year: i32,
        build: &dyn Fn(ActivityId) -> Activity,
    ) -> Result<Activity, StoreError> {
        let mut wtxn = self.lmdb.env().write_txn().map_err(LmdbError::from)?;
        let last = match self
            .lmdb
            .meta_db
            .get(&wtxn, ACTIVITY_SEQ_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Corruption("activity_seq has unexpected byte length".to_string())
                })?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let seq = last + 1;
        let activity = build(ActivityId::new(year, seq));
        if activity.id.sequence() != seq {
            return Err(StoreError::Conflict(format!(
                "activity built with foreign identity {}",
                activity.id
            )));
        }

        let bytes = bincode::serialize(&activity).map_err(LmdbError::from)?;
        self.lmdb
            .activities_db
            .put(&mut wtxn, &u64_key(seq), &bytes)
            .map_err(LmdbError::from)?;
        self.lmdb
            .meta_db
            .put(&mut wtxn, ACTIVITY_SEQ_KEY, &u64_key(seq))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(activity)
    }

    fn get_activity(&self, id: &ActivityId) -> Result<Activity, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        Ok(read_activity(&self.lmdb, &rtxn, id)?)
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

        let mut wtxn = self.lmdb.env().write_txn().map_err(LmdbError::from)?;
        let stored = read_activity(&self.lmdb, &wtxn, &activity.id)?;
        check_current(&stored, expected, activity.revision)?;

        let mut written = activity.clone();
        written.revision += 1;
        let bytes = bincode::serialize(&written).map_err(LmdbError::from)?;
        self.lmdb
            .activities_db
            .put(&mut wtxn, &u64_key(written.id.sequence()), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(written)
    }

    fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        let iter = self
            .lmdb
            .activities_db
            .iter(&rtxn)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let activity: Activity = bincode::deserialize(val).map_err(LmdbError::from)?;
            if filter.matches(&activity) {
                results.push(activity);
            }
        }
        Ok(results)
    }

    fn activity_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.lmdb.env().read_txn().map_err(LmdbError::from)?;
        let count = self
            .lmdb
            .activities_db
            .len(&rtxn)
            .map_err(LmdbError::from)?;
        Ok(count)
    }
}
