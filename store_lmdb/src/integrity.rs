//! Startup integrity check for a data directory.
//!
//! Runs before the service accepts requests. Problems are collected into the
//! report instead of aborting at the first one, so an operator sees all of
//! them at once.

use std::collections::BTreeMap;
use std::path::Path;

use heed::types::Bytes;
use heed::RoTxn;

use crate::environment::{hash_from_bytes, LmdbEnvironment};
use crate::LmdbError;

#[derive(Debug, Default)]
pub struct IntegrityReport {
    /// Entry count per named database that could be read.
    pub entries: BTreeMap<&'static str, u64>,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }

    /// Stored activities, or 0 if the database could not be read.
    pub fn activities(&self) -> u64 {
        self.entries.get("activities").copied().unwrap_or(0)
    }

    /// Stored certificates, or 0 if the database could not be read.
    pub fn certificates(&self) -> u64 {
        self.entries.get("certificates").copied().unwrap_or(0)
    }
}

/// Every named database a valid data directory contains.
pub const EXPECTED_DATABASES: &[&str] = &[
    "activities",
    "certificates",
    "certificate_by_activity",
    "certificate_by_block",
    "verifications",
    "meta",
];

/// Count every expected database, then cross-check the chain indexes.
///
/// The block index must run contiguously from 1 up to the stored tail, every
/// entry must point at a stored certificate, and the activity index must be
/// the same size as the certificate table.
pub fn check_integrity(lmdb: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = lmdb.env().read_txn()?;

    for &name in EXPECTED_DATABASES {
        match count_entries(lmdb, &rtxn, name) {
            Ok(count) => {
                report.entries.insert(name, count);
            }
            Err(e) => report.errors.push(e),
        }
    }

    let certificates = report.entries.get("certificates").copied();
    let indexed = report.entries.get("certificate_by_activity").copied();
    if let (Some(certificates), Some(indexed)) = (certificates, indexed) {
        if certificates != indexed {
            report.errors.push(format!(
                "{} certificates but {} activity index entries",
                certificates, indexed
            ));
        }
    }

    let tail = lmdb.read_tail(&rtxn)?;
    let mut expected_block = 1u64;
    for result in lmdb.by_block_db.iter(&rtxn).map_err(LmdbError::from)? {
        let (key, val) = result.map_err(LmdbError::from)?;
        let block = match <[u8; 8]>::try_from(key) {
            Ok(arr) => u64::from_be_bytes(arr),
            Err(_) => {
                report.errors.push(format!("malformed block key of {} bytes", key.len()));
                continue;
            }
        };
        if block != expected_block {
            report
                .errors
                .push(format!("block index gap: expected {}, found {}", expected_block, block));
        }
        expected_block = block + 1;
        match hash_from_bytes(val) {
            Ok(hash) => {
                if lmdb
                    .certificates_db
                    .get(&rtxn, hash.as_bytes())
                    .map_err(LmdbError::from)?
                    .is_none()
                {
                    report
                        .errors
                        .push(format!("block {} points at missing certificate", block));
                }
            }
            Err(e) => report.errors.push(format!("block {}: {}", block, e)),
        }
    }
    if expected_block != tail.next_block {
        report.errors.push(format!(
            "chain tail expects block {}, index ends before {}",
            tail.next_block, expected_block
        ));
    }

    Ok(report)
}

/// Refuse a data directory that exists but holds no `data.mdb`.
///
/// A missing directory is fine (it is created on open); an existing one
/// without the data file usually means a wrong path, and opening it would
/// silently start an empty ledger.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if path.exists() && !path.join("data.mdb").exists() {
        return Err(format!(
            "{} exists but contains no data.mdb; refusing to start an empty ledger there",
            path.display()
        ));
    }
    Ok(())
}

fn count_entries(lmdb: &LmdbEnvironment, rtxn: &RoTxn, name: &str) -> Result<u64, String> {
    match lmdb.env().open_database::<Bytes, Bytes>(rtxn, Some(name)) {
        Ok(Some(db)) => db
            .len(rtxn)
            .map_err(|e| format!("database '{}' unreadable: {}", name, e)),
        Ok(None) => Err(format!("database '{}' is missing", name)),
        Err(e) => Err(format!("database '{}' failed to open: {}", name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_path_passes_the_directory_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("not-yet-created")).is_ok());
    }

    #[test]
    fn existing_directory_without_data_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn fresh_environment_is_healthy_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 8, 1 << 20).unwrap();
        let report = check_integrity(&env).unwrap();
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.entries.len(), EXPECTED_DATABASES.len());
        assert_eq!(report.activities(), 0);
        assert_eq!(report.certificates(), 0);
    }
}
