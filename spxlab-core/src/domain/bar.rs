//! Bar: the fundamental market data unit.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Timestamp of a bar, either zone-less or pinned to a named zone.
///
/// Zone-less stamps are read as UTC wall-clock time wherever an instant is
/// needed (ordering, conversion, day bucketing before normalization).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Zoned(DateTime<Tz>),
}

impl Timestamp {
    /// The absolute instant this stamp refers to.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Naive(naive) => Utc.from_utc_datetime(naive),
            Timestamp::Zoned(dt) => dt.with_timezone(&Utc),
        }
    }

    /// Civil date as seen in the stamp's own zone (UTC for naive stamps).
    pub fn local_date(&self) -> NaiveDate {
        match self {
            Timestamp::Naive(naive) => naive.date(),
            Timestamp::Zoned(dt) => dt.date_naive(),
        }
    }

    /// Re-express this stamp in `zone`, resolving the offset at this instant.
    pub fn in_zone(&self, zone: Tz) -> Timestamp {
        Timestamp::Zoned(self.instant().with_timezone(&zone))
    }

    pub fn zone(&self) -> Option<Tz> {
        match self {
            Timestamp::Naive(_) => None,
            Timestamp::Zoned(dt) => Some(dt.timezone()),
        }
    }

    pub fn from_unix(secs: i64, zone: Tz) -> Option<Timestamp> {
        DateTime::from_timestamp(secs, 0).map(|utc| Timestamp::Zoned(utc.with_timezone(&zone)))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant() == other.instant()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S")),
            Timestamp::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S %Z")),
        }
    }
}

/// OHLCV bar for one sampling interval.
///
/// The provider is trusted to deliver high >= max(open, close) and
/// min(open, close) >= low; downstream math assumes it but does not check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
