//! Key metrics and return statistics: pure functions over a bar series.
//!
//! Returns are fractional (0.01 = 1%). Volatility is annualised with the
//! sample standard deviation, matching the Bollinger band convention.

use crate::domain::BarSeries;
use crate::indicators::rolling_std_of_series;
use serde::Serialize;

/// Trading days per year used to annualise daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Headline numbers for a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub current_price: f64,
    /// Last close versus the previous close, in percent. `None` for a single bar.
    pub change_pct: Option<f64>,
    pub period_high: f64,
    pub period_low: f64,
    pub avg_volume: f64,
}

/// `None` for an empty series.
pub fn key_metrics(series: &BarSeries) -> Option<KeyMetrics> {
    let last = series.last()?;
    let change_pct = match series.bars.len() {
        0 | 1 => None,
        n => {
            let prev = series.bars[n - 2].close;
            Some((last.close / prev - 1.0) * 100.0)
        }
    };

    let period_high = series
        .bars
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let period_low = series
        .bars
        .iter()
        .map(|b| b.low)
        .fold(f64::INFINITY, f64::min);
    let total_volume: f64 = series.bars.iter().map(|b| b.volume as f64).sum();

    Some(KeyMetrics {
        current_price: last.close,
        change_pct,
        period_high,
        period_low,
        avg_volume: total_volume / series.len() as f64,
    })
}

/// Close-to-close fractional returns; the first bar has none and is dropped.
pub fn daily_returns(series: &BarSeries) -> Vec<f64> {
    series
        .bars
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect()
}

/// Rolling sample std of `returns` over `window`, scaled by sqrt(periods_per_year).
/// First `window - 1` positions are NaN.
pub fn rolling_volatility(returns: &[f64], window: usize, periods_per_year: f64) -> Vec<f64> {
    let scale = periods_per_year.sqrt();
    rolling_std_of_series(returns, window)
        .into_iter()
        .map(|s| s * scale)
        .collect()
}

/// One bucket of a histogram, half-open `[lower, upper)` except the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width buckets spanning the finite values' range.
///
/// Non-finite values are ignored. A constant input collapses into one bucket.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for v in finite {
        // max lands in the last bucket
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
