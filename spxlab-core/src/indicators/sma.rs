//! Simple Moving Average (SMA) and rolling standard deviation.
//!
//! Rolling mean of close prices over a trailing window.
//! Lookback: window - 1 (first valid value at index window-1).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma_of_series(&closes, self.window)
    }
}

/// Rolling mean over an arbitrary series. Any NaN inside a window makes that
/// position NaN; a zero window yields all NaN.
pub fn sma_of_series(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window {
        return result;
    }

    // Compute initial window sum
    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(window) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }

    if !nan_in_window {
        result[window - 1] = sum / window as f64;
    }

    // Roll the window forward
    for i in window..n {
        let leaving = values[i - window];
        let entering = values[i];
        sum = sum - leaving + entering;

        // A NaN poisons the running sum, so rescan once one has been seen.
        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - window)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / window as f64;
    }

    result
}

/// Rolling sample standard deviation (n - 1 denominator) over `window`.
///
/// Aligned with [`sma_of_series`]: defined at exactly the same positions,
/// except that a window of 1 has no sample deviation and stays NaN.
pub fn rolling_std_of_series(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window < 2 || n < window {
        return result;
    }

    let means = sma_of_series(values, window);
    for i in (window - 1)..n {
        let mean = means[i];
        if mean.is_nan() {
            continue;
        }
        let sum_sq: f64 = values[(i + 1 - window)..=i]
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();
        result[i] = (sum_sq / (window - 1) as f64).sqrt();
    }

    result
}
