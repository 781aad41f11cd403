//! Timestamp type and the clock abstraction.
//!
//! Timestamps are Unix epoch seconds (UTC). Certificate content hashes embed
//! the issuance timestamp, so it is kept at whole-second resolution to make the
//! canonical encoding unambiguous.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    fn to_datetime(self) -> DateTime<Utc> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .unwrap_or_default()
    }

    /// Calendar year (UTC) this timestamp falls in.
    pub fn year(&self) -> i32 {
        self.to_datetime().year()
    }

    /// Calendar date (UTC) this timestamp falls on.
    pub fn date(&self) -> NaiveDate {
        self.to_datetime().date_naive()
    }

    /// RFC 3339 rendering, e.g. `2026-03-01T12:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current time.
///
/// Production code uses [`SystemClock`]; tests inject a controllable clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_fields() {
        // 2026-03-01T12:00:00Z
        let ts = Timestamp::new(1_772_366_400);
        assert_eq!(ts.year(), 2026);
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(ts.to_rfc3339(), "2026-03-01T12:00:00Z");
    }

    #[test]
    fn epoch_renders() {
        assert_eq!(Timestamp::EPOCH.year(), 1970);
        assert_eq!(Timestamp::EPOCH.to_rfc3339(), "1970-01-01T00:00:00Z");
    }
}
