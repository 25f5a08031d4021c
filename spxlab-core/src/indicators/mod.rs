//! Indicator engine.
//!
//! Pure functions, bar history in, numeric column out, always the same length
//! as the input. Undefined positions (warm-up, too-short input, NaN inputs)
//! are `f64::NAN`; insufficient data is never an error.
//!
//! Multi-line indicators (Bollinger, MACD) are exposed as separate named
//! instances per line, keeping the single-column `Indicator` trait.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;

pub use bollinger::{bollinger_of_series, Bollinger, BollingerBand, BollingerColumns};
pub use ema::{ema_of_series, Ema};
pub use macd::{macd_of_series, Macd, MacdColumns, MacdLine, MacdParams};
pub use rsi::{rsi_of_series, Rsi};
pub use set::{compute_indicators, AugmentedSeries, IndicatorSet, IndicatorSpec};
pub use sma::{rolling_std_of_series, sma_of_series, Sma};

use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t: computing over a truncated
/// series must reproduce the prefix of the full computation.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic daily bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use crate::domain::Timestamp;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: Timestamp::Naive(base + chrono::Duration::days(i as i64)),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
