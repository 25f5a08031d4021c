//! Timezone normalization.
//!
//! Rewrites every bar's timestamp into a display zone. Offsets are resolved
//! per instant through the tz database, so a series spanning a DST change
//! carries both offsets. Zone-less stamps are read as UTC first.
//!
//! An unresolvable zone never aborts retrieval: the input comes back
//! unchanged together with a warning.

use crate::domain::{Bar, BarSeries};
use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeWarning {
    #[error("unknown timezone '{0}', timestamps left unchanged")]
    UnknownZone(String),
}

/// Output of [`normalize`].
#[derive(Debug, Clone)]
pub struct Normalized {
    pub series: BarSeries,
    pub warning: Option<NormalizeWarning>,
}

pub fn resolve_zone(name: &str) -> Result<Tz, NormalizeWarning> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| NormalizeWarning::UnknownZone(name.to_string()))
}

/// Convert `series` into the zone named `zone`.
pub fn normalize(series: &BarSeries, zone: &str) -> Normalized {
    match resolve_zone(zone) {
        Ok(tz) => Normalized {
            series: normalize_to(series, tz),
            warning: None,
        },
        Err(warning) => {
            tracing::warn!(symbol = %series.symbol, %warning, "timezone normalization skipped");
            Normalized {
                series: series.clone(),
                warning: Some(warning),
            }
        }
    }
}

/// Convert `series` into an already-resolved zone.
pub fn normalize_to(series: &BarSeries, zone: Tz) -> BarSeries {
    let bars = series
        .bars
        .iter()
        .map(|bar| Bar {
            timestamp: bar.timestamp.in_zone(zone),
            ..bar.clone()
        })
        .collect();
    BarSeries {
        symbol: series.symbol.clone(),
        granularity: series.granularity,
        bars,
    }
}

/// UTC instant of local midnight on `date` in `zone`.
///
/// Ambiguous midnights take the earlier instant; a midnight skipped by a DST
/// jump falls back to UTC day start.
pub fn local_midnight(date: NaiveDate, zone: Tz) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Half-open UTC window `[start, end)` covering the civil day `date` in `zone`.
pub fn day_bounds(date: NaiveDate, zone: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date + Duration::days(1);
    (local_midnight(date, zone), local_midnight(next, zone))
}
