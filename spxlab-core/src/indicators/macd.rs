//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(signal) of the MACD line;
//! histogram = MACD - signal. Exposed as three Indicator instances, one per line.
//!
//! Parameters are taken as given. fast >= slow produces a degenerate or
//! inverted MACD, which is returned as computed.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdColumns {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    params: MacdParams,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(params: MacdParams, line: MacdLine) -> Self {
        let prefix = match line {
            MacdLine::Macd => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_hist",
        };
        Self {
            params,
            line,
            name: format!("{prefix}_{}_{}_{}", params.fast, params.slow, params.signal),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let columns = macd_of_series(&closes, self.params);
        match self.line {
            MacdLine::Macd => columns.macd,
            MacdLine::Signal => columns.signal,
            MacdLine::Histogram => columns.histogram,
        }
    }
}

pub fn macd_of_series(values: &[f64], params: MacdParams) -> MacdColumns {
    let fast = ema_of_series(values, params.fast);
    let slow = ema_of_series(values, params.slow);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&macd, params.signal);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdColumns {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes = [100.0, 101.5, 99.0, 103.0, 104.5, 102.0, 106.0, 107.5];
        let cols = macd_of_series(&closes, MacdParams::default());
        for i in 0..closes.len() {
            assert_approx(cols.histogram[i], cols.macd[i] - cols.signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn macd_starts_at_zero() {
        // Both EMAs seed from the first close, so the first MACD value is 0.
        let cols = macd_of_series(&[50.0, 51.0, 52.0], MacdParams::default());
        assert_approx(cols.macd[0], 0.0, DEFAULT_EPSILON);
        assert_approx(cols.signal[0], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let cols = macd_of_series(&closes, MacdParams::default());
        assert!(cols.macd[39] > 0.0);
    }

    #[test]
    fn inverted_params_are_not_corrected() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let normal = macd_of_series(&closes, MacdParams { fast: 12, slow: 26, signal: 9 });
        let inverted = macd_of_series(&closes, MacdParams { fast: 26, slow: 12, signal: 9 });
        assert!(inverted.macd[39] < 0.0);
        assert_approx(inverted.macd[39], -normal.macd[39], 1e-9);
    }

    #[test]
    fn indicator_lines_match_columns() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 13.0, 15.0, 14.0]);
        let params = MacdParams { fast: 3, slow: 5, signal: 2 };
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let cols = macd_of_series(&closes, params);
        assert_eq!(Macd::new(params, MacdLine::Signal).compute(&bars), cols.signal);
        assert_eq!(Macd::new(params, MacdLine::Histogram).name(), "macd_hist_3_5_2");
    }

    #[test]
    fn empty_input() {
        let cols = macd_of_series(&[], MacdParams::default());
        assert!(cols.macd.is_empty() && cols.signal.is_empty() && cols.histogram.is_empty());
    }
}
