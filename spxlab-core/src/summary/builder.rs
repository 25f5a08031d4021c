//! Daily summary table.
//!
//! Resamples a series to daily bars, attaches day-over-day change and trend,
//! keeps the most recent `lookback_days`, and for each of those days fetches
//! that day's intraday bars (with date fallback) to measure the move over the
//! last few samples of the session.
//!
//! Each day's intraday fetch is isolated: a failure degrades that one row to
//! a neutral delta and never touches its neighbours.

use super::resample::resample_daily;
use crate::data::{BarProvider, FallbackRetriever, DEFAULT_MAX_DAYS_BACK};
use crate::domain::{BarSeries, Granularity};
use chrono::{Datelike, NaiveDate, Weekday};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Upper bound on concurrent intraday fetches.
pub const MAX_WORKERS: usize = 16;

/// Three-way direction tag. Exactly zero is its own class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn classify(change: f64) -> Trend {
        if change > 0.0 {
            Trend::Up
        } else if change < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Most recent resampled days to keep.
    pub lookback_days: usize,
    /// Interval used for the per-day intraday fetch.
    pub intraday: Granularity,
    /// Trailing samples of the session used for the end-of-day delta.
    pub last_window: usize,
    /// Date-fallback budget per day.
    pub max_days_back: u32,
    /// Intraday fetch workers; 0 or 1 runs sequentially, capped at `MAX_WORKERS`.
    pub workers: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            intraday: Granularity::OneMinute,
            last_window: 5,
            max_days_back: DEFAULT_MAX_DAYS_BACK,
            workers: 1,
        }
    }
}

/// One calendar day of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummaryRow {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub open: f64,
    pub close: f64,
    /// Percent change of close versus the previous resampled day.
    /// `None` for the first day of the resampled series.
    pub change_pct: Option<f64>,
    pub trend: Option<Trend>,
    /// Point change across the last intraday samples; 0.0 when unavailable.
    pub last_window_change: f64,
    pub last_window_trend: Trend,
    /// Day the intraday bars actually came from, if any were found.
    pub intraday_date: Option<NaiveDate>,
}

/// Resampled day with its day-over-day change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub volume: u64,
    pub change_pct: Option<f64>,
    pub trend: Option<Trend>,
}

/// End-of-session move for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntradayDelta {
    pub change: f64,
    pub trend: Trend,
    pub source_date: Option<NaiveDate>,
}

impl IntradayDelta {
    pub fn neutral() -> Self {
        Self {
            change: 0.0,
            trend: Trend::Flat,
            source_date: None,
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Resample and attach (close_t / close_{t-1} - 1) * 100 with its trend tag.
pub fn daily_changes(series: &BarSeries) -> Vec<DailyChange> {
    let days = resample_daily(series);
    let mut prev_close: Option<f64> = None;
    days.into_iter()
        .map(|day| {
            let change_pct = prev_close.map(|prev| (day.close / prev - 1.0) * 100.0);
            prev_close = Some(day.close);
            DailyChange {
                date: day.date,
                open: day.open,
                close: day.close,
                volume: day.volume,
                change_pct,
                trend: change_pct.map(Trend::classify),
            }
        })
        .collect()
}

/// close(last) - close(first) over the final `window` bars, if at least two exist.
pub fn last_window_delta(series: &BarSeries, window: usize) -> Option<f64> {
    let tail = series.tail(window);
    match (tail.first(), tail.last()) {
        (Some(first), Some(last)) if tail.len() >= 2 => Some(last.close - first.close),
        _ => None,
    }
}

/// Intraday delta for one day, neutral when no usable bars turn up.
pub fn intraday_delta<P: BarProvider>(
    retriever: &FallbackRetriever<'_, P>,
    symbol: &str,
    date: NaiveDate,
    options: &SummaryOptions,
) -> IntradayDelta {
    let Some(dated) =
        retriever.fetch_with_fallback(symbol, date, options.intraday, options.max_days_back)
    else {
        tracing::warn!(symbol, %date, "no intraday bars for summary row, using neutral delta");
        return IntradayDelta::neutral();
    };

    match last_window_delta(&dated.series, options.last_window) {
        Some(change) => IntradayDelta {
            change,
            trend: Trend::classify(change),
            source_date: Some(dated.actual),
        },
        None => {
            tracing::warn!(
                symbol,
                %date,
                bars = dated.series.len(),
                "too few intraday bars for summary row, using neutral delta"
            );
            IntradayDelta::neutral()
        }
    }
}

/// Threads worth spawning for `days` fetches.
fn pool_size(requested: usize, days: usize) -> usize {
    requested.min(MAX_WORKERS).min(days)
}

fn intraday_deltas<P: BarProvider>(
    retriever: &FallbackRetriever<'_, P>,
    symbol: &str,
    dates: &[NaiveDate],
    options: &SummaryOptions,
) -> Vec<IntradayDelta> {
    let sequential = || {
        dates
            .iter()
            .map(|&date| intraday_delta(retriever, symbol, date, options))
            .collect()
    };

    let workers = pool_size(options.workers, dates.len());
    if workers <= 1 {
        return sequential();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
    {
        // Indexed collect keeps chronological order whatever the completion order.
        Ok(pool) => pool.install(|| {
            dates
                .par_iter()
                .map(|&date| intraday_delta(retriever, symbol, date, options))
                .collect()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "worker pool unavailable, fetching sequentially");
            sequential()
        }
    }
}

/// Build the summary table, oldest day first.
pub fn build_summary<P: BarProvider>(
    series: &BarSeries,
    retriever: &FallbackRetriever<'_, P>,
    options: &SummaryOptions,
) -> Vec<DailySummaryRow> {
    let changes = daily_changes(series);
    let start = changes.len().saturating_sub(options.lookback_days);
    let recent = &changes[start..];

    let dates: Vec<NaiveDate> = recent.iter().map(|d| d.date).collect();
    let deltas = intraday_deltas(retriever, &series.symbol, &dates, options);

    let rows: Vec<DailySummaryRow> = recent
        .iter()
        .zip(deltas)
        .map(|(day, delta)| DailySummaryRow {
            date: day.date,
            weekday: weekday_name(day.date.weekday()),
            open: day.open,
            close: day.close,
            change_pct: day.change_pct,
            trend: day.trend,
            last_window_change: delta.change,
            last_window_trend: delta.trend,
            intraday_date: delta.source_date,
        })
        .collect();

    let degraded = rows.iter().filter(|r| r.intraday_date.is_none()).count();
    tracing::debug!(
        symbol = %series.symbol,
        rows = rows.len(),
        degraded,
        "daily summary built"
    );
    rows
}
