//! Identity newtypes for activities, certificates, and users.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Width of the zero-padded sequence component.
const SEQ_WIDTH: usize = 6;

/// Human-readable activity identity: `ACT-<year>-<6-digit sequence>`.
///
/// Assigned exactly once, by the store, at first persistence.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityId(String);

impl ActivityId {
    pub const PREFIX: &'static str = "ACT";

    /// Build the identity for a given year and store sequence number.
    pub fn new(year: i32, seq: u64) -> Self {
        Self(format!("{}-{}-{:0width$}", Self::PREFIX, year, seq, width = SEQ_WIDTH))
    }

    /// Parse a client-supplied identity, rejecting anything not shaped like one.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if parse_prefixed(raw, Self::PREFIX).is_some() {
            Ok(Self(raw.to_string()))
        } else {
            Err(TypesError::InvalidId(raw.to_string()))
        }
    }

    /// The sequence component.
    pub fn sequence(&self) -> u64 {
        parse_prefixed(&self.0, Self::PREFIX)
            .map(|(_, seq)| seq)
            .unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Certificate identity: `CERT-<year>-<6-digit block number>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateId(String);

impl CertificateId {
    pub const PREFIX: &'static str = "CERT";

    pub fn new(year: i32, block_number: u64) -> Self {
        Self(format!(
            "{}-{}-{:0width$}",
            Self::PREFIX,
            year,
            block_number,
            width = SEQ_WIDTH
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque user reference issued by the external identity provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypesError::InvalidId(s));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split `PREFIX-<year>-<seq>` into its numeric parts.
fn parse_prefixed(raw: &str, prefix: &str) -> Option<(i32, u64)> {
    let mut parts = raw.splitn(3, '-');
    if parts.next()? != prefix {
        return None;
    }
    let year = parts.next()?;
    let seq = parts.next()?;
    if year.len() != 4 || seq.len() < SEQ_WIDTH {
        return None;
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_id_format() {
        let id = ActivityId::new(2026, 42);
        assert_eq!(id.as_str(), "ACT-2026-000042");
        assert_eq!(id.sequence(), 42);
    }

    #[test]
    fn activity_id_wide_sequence() {
        let id = ActivityId::new(2026, 1_234_567);
        assert_eq!(id.as_str(), "ACT-2026-1234567");
        assert_eq!(ActivityId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn activity_id_parse_rejects_garbage() {
        assert!(ActivityId::parse("ACT-2026-000001").is_ok());
        assert!(ActivityId::parse("ACT-2026-01").is_err());
        assert!(ActivityId::parse("CERT-2026-000001").is_err());
        assert!(ActivityId::parse("ACT-26-000001").is_err());
        assert!(ActivityId::parse("ACT-2026-00000x").is_err());
        assert!(ActivityId::parse("../etc/passwd").is_err());
    }

    #[test]
    fn certificate_id_format() {
        assert_eq!(CertificateId::new(2026, 7).as_str(), "CERT-2026-000007");
    }

    #[test]
    fn user_id_trims_and_rejects_empty() {
        assert_eq!(UserId::new("  u-1 ").unwrap().as_str(), "u-1");
        assert!(UserId::new("   ").is_err());
    }
}
