//! Daily resampling of any-interval bars.
//!
//! Bars are bucketed by the civil date of their own timestamp, so a series
//! normalized to the exchange zone buckets by exchange trading day.
//! - Open = first open of the day (earliest instant)
//! - High = max high
//! - Low = min low
//! - Close = last close of the day (latest instant)
//! - Volume = sum of volumes
//!
//! Days with no bars produce no output row.

use crate::domain::BarSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

pub fn resample_daily(series: &BarSeries) -> Vec<DailyBar> {
    let mut days: BTreeMap<NaiveDate, DailyBar> = BTreeMap::new();

    // Canonical order is by instant, so the first bar seen for a date is its open.
    for bar in &series.bars {
        let date = bar.timestamp.local_date();
        days.entry(date)
            .and_modify(|day| {
                day.high = day.high.max(bar.high);
                day.low = day.low.min(bar.low);
                day.close = bar.close;
                day.volume = day.volume.saturating_add(bar.volume);
            })
            .or_insert_with(|| DailyBar {
                date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            });
    }

    days.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, Granularity, Timestamp};
    use chrono::TimeZone;

    fn four_hour_bar(day: u32, hour: u32, ohlc: (f64, f64, f64, f64), volume: u64) -> Bar {
        let dt = chrono_tz::America::New_York
            .with_ymd_and_hms(2024, 5, day, hour, 0, 0)
            .single()
            .unwrap();
        Bar {
            timestamp: Timestamp::Zoned(dt),
            open: ohlc.0,
            high: ohlc.1,
            low: ohlc.2,
            close: ohlc.3,
            volume,
        }
    }

    #[test]
    fn aggregates_ohlcv_per_day() {
        let series = BarSeries::new(
            "^GSPC",
            Granularity::FourHour,
            vec![
                four_hour_bar(1, 9, (100.0, 104.0, 99.0, 103.0), 10),
                four_hour_bar(1, 13, (103.0, 106.0, 101.0, 102.0), 20),
                four_hour_bar(2, 9, (102.0, 103.0, 97.0, 98.0), 5),
            ],
        );
        let days = resample_daily(&series);
        assert_eq!(days.len(), 2);
        let first = &days[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!((first.open, first.high, first.low, first.close), (100.0, 106.0, 99.0, 102.0));
        assert_eq!(first.volume, 30);
        assert_eq!(days[1].volume, 5);
    }

    #[test]
    fn skips_days_without_bars() {
        let series = BarSeries::new(
            "^GSPC",
            Granularity::FourHour,
            vec![
                four_hour_bar(3, 9, (1.0, 1.0, 1.0, 1.0), 1),
                four_hour_bar(6, 9, (2.0, 2.0, 2.0, 2.0), 1),
            ],
        );
        let dates: Vec<_> = resample_daily(&series).iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
            ]
        );
    }

    #[test]
    fn empty_series_resamples_to_nothing() {
        assert!(resample_daily(&BarSeries::empty("^GSPC", Granularity::OneMinute)).is_empty());
    }
}
