//! Relative Strength Index (RSI).
//!
//! Simple rolling means of gains and of loss magnitudes over `window` deltas.
//! RSI = 100 - 100 / (1 + mean_gain / mean_loss)
//! Lookback: window (the first delta is undefined).
//! Edge cases: mean_loss == 0 with gains → 100; both zero → NaN (RS is 0/0).

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("rsi_{window}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi_of_series(&closes, self.window)
    }
}

/// RSI over an arbitrary series.
pub fn rsi_of_series(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if window == 0 || n < window + 1 {
        return result;
    }

    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let delta = values[i] - values[i - 1];
        if delta.is_nan() {
            continue;
        }
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    let mean_gain = sma_of_series(&gains, window);
    let mean_loss = sma_of_series(&losses, window);

    // Moves in each direction inside the current window of deltas.
    let (mut ups, mut downs) = (0usize, 0usize);
    for i in 1..n {
        ups += usize::from(gains[i] > 0.0);
        downs += usize::from(losses[i] > 0.0);
        if i > window {
            ups -= usize::from(gains[i - window] > 0.0);
            downs -= usize::from(losses[i - window] > 0.0);
        }
        if i < window {
            continue;
        }

        let (gain, loss) = (mean_gain[i], mean_loss[i]);
        if gain.is_nan() || loss.is_nan() {
            continue;
        }
        // Rolling sums keep a residue after the last move leaves the window.
        let gain = if ups == 0 { 0.0 } else { gain.max(0.0) };
        let loss = if downs == 0 { 0.0 } else { loss.max(0.0) };
        result[i] = rsi_from_means(gain, loss);
    }

    result
}

fn rsi_from_means(mean_gain: f64, mean_loss: f64) -> f64 {
    if mean_loss == 0.0 && mean_gain == 0.0 {
        f64::NAN
    } else if mean_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + mean_gain / mean_loss)
    }
}
