//! Date-fallback retrieval for single-day intraday requests.
//!
//! Intraday bars are missing on weekends, holidays and for dates the provider
//! has not published yet. Instead of failing outright, the retriever walks
//! back one calendar day at a time until a day with bars turns up or the
//! step budget runs out.

use super::provider::BarProvider;
use super::source::BarSource;
use super::timezone::{day_bounds, normalize_to};
use crate::domain::{BarSeries, Granularity, Span};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

pub const DEFAULT_MAX_DAYS_BACK: u32 = 7;

/// A single-day series together with the day it actually came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedSeries {
    pub series: BarSeries,
    pub requested: NaiveDate,
    pub actual: NaiveDate,
}

impl DatedSeries {
    /// Number of days stepped back from the requested date.
    pub fn steps(&self) -> i64 {
        (self.requested - self.actual).num_days()
    }

    pub fn substituted(&self) -> bool {
        self.requested != self.actual
    }
}

/// Bounded backward search over a bar source.
///
/// Day boundaries are taken in `zone`, and the returned bars are expressed in
/// that zone.
pub struct FallbackRetriever<'a, P> {
    source: &'a BarSource<P>,
    zone: Tz,
}

impl<'a, P: BarProvider> FallbackRetriever<'a, P> {
    pub fn new(source: &'a BarSource<P>, zone: Tz) -> Self {
        Self { source, zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Bars for the civil day `date` only, possibly empty.
    pub fn fetch_day(&self, symbol: &str, date: NaiveDate, granularity: Granularity) -> BarSeries {
        let (start, end) = day_bounds(date, self.zone);
        let fetched = self
            .source
            .fetch(symbol, granularity, Span::Range { start, end });
        let mut local = normalize_to(&fetched, self.zone);
        local.bars.retain(|b| b.timestamp.local_date() == date);
        local
    }

    /// Try `date`, then up to `max_days_back` earlier days.
    ///
    /// Returns `None` when every attempt came back empty. `date` itself is
    /// never altered; the day used is reported in `DatedSeries::actual`.
    pub fn fetch_with_fallback(
        &self,
        symbol: &str,
        date: NaiveDate,
        granularity: Granularity,
        max_days_back: u32,
    ) -> Option<DatedSeries> {
        for step in 0..=max_days_back {
            let day = date - Duration::days(i64::from(step));
            let series = self.fetch_day(symbol, day, granularity);
            if !series.is_empty() {
                if step > 0 {
                    tracing::info!(
                        symbol,
                        requested = %date,
                        actual = %day,
                        steps = step,
                        "no intraday bars on requested date, using earlier day"
                    );
                }
                return Some(DatedSeries {
                    series,
                    requested: date,
                    actual: day,
                });
            }
            tracing::debug!(symbol, date = %day, granularity = %granularity, "no bars, stepping back");
        }

        tracing::warn!(
            symbol,
            requested = %date,
            max_days_back,
            "date fallback exhausted without finding bars"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryProvider;
    use crate::domain::{Bar, Timestamp};
    use chrono::{TimeZone, Utc};

    fn minute_bars(date: NaiveDate, count: u32) -> Vec<Bar> {
        let ny = chrono_tz::America::New_York;
        (0..count)
            .map(|i| {
                let local = date.and_hms_opt(15, 50 + i, 0).unwrap();
                let dt = ny.from_local_datetime(&local).single().unwrap();
                Bar {
                    timestamp: Timestamp::Zoned(dt.with_timezone(&chrono_tz::UTC)),
                    open: 5000.0 + i as f64,
                    high: 5001.0 + i as f64,
                    low: 4999.0 + i as f64,
                    close: 5000.5 + i as f64,
                    volume: 100,
                }
            })
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn requested_day_with_data_needs_one_call() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let friday = d(2024, 5, 3);
        let source = BarSource::new(
            MemoryProvider::new(now).with_bars("^GSPC", Granularity::OneMinute, minute_bars(friday, 5)),
        );
        let retriever = FallbackRetriever::new(&source, chrono_tz::America::New_York);
        let got = retriever
            .fetch_with_fallback("^GSPC", friday, Granularity::OneMinute, DEFAULT_MAX_DAYS_BACK)
            .unwrap();
        assert_eq!(got.actual, friday);
        assert!(!got.substituted());
        assert_eq!(got.series.len(), 5);
        assert_eq!(source.provider().calls(), 1);
    }

    #[test]
    fn sunday_steps_back_to_friday() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let friday = d(2024, 5, 3);
        let source = BarSource::new(
            MemoryProvider::new(now).with_bars("^GSPC", Granularity::OneMinute, minute_bars(friday, 3)),
        );
        let retriever = FallbackRetriever::new(&source, chrono_tz::America::New_York);
        let got = retriever
            .fetch_with_fallback("^GSPC", d(2024, 5, 5), Granularity::OneMinute, 7)
            .unwrap();
        assert_eq!(got.actual, friday);
        assert_eq!(got.requested, d(2024, 5, 5));
        assert_eq!(got.steps(), 2);
        assert_eq!(source.provider().calls(), 3);
    }

    #[test]
    fn exhausted_budget_returns_none() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let source = BarSource::new(
            MemoryProvider::new(now).with_bars("^GSPC", Granularity::OneMinute, minute_bars(d(2024, 4, 1), 3)),
        );
        let retriever = FallbackRetriever::new(&source, chrono_tz::America::New_York);
        assert!(retriever
            .fetch_with_fallback("^GSPC", d(2024, 5, 5), Granularity::OneMinute, 3)
            .is_none());
        // The requested day plus three earlier days.
        assert_eq!(source.provider().calls(), 4);
    }

    #[test]
    fn zero_budget_tries_only_requested_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let source = BarSource::new(MemoryProvider::new(now).failing_for("^GSPC"));
        let retriever = FallbackRetriever::new(&source, chrono_tz::America::New_York);
        assert!(retriever
            .fetch_with_fallback("^GSPC", d(2024, 5, 3), Granularity::OneMinute, 0)
            .is_none());
        assert_eq!(source.provider().calls(), 1);
    }

    #[test]
    fn fetched_bars_are_in_retriever_zone() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        let friday = d(2024, 5, 3);
        let source = BarSource::new(
            MemoryProvider::new(now).with_bars("^GSPC", Granularity::OneMinute, minute_bars(friday, 2)),
        );
        let retriever = FallbackRetriever::new(&source, chrono_tz::America::New_York);
        let day = retriever.fetch_day("^GSPC", friday, Granularity::OneMinute);
        assert!(day
            .bars
            .iter()
            .all(|b| b.timestamp.zone() == Some(chrono_tz::America::New_York)));
    }
}
