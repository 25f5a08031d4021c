//! Bollinger Bands: moving average +/- k standard deviations.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, window)
//! - Upper: middle + k * stddev(close, window)
//! - Lower: middle - k * stddev(close, window)
//!
//! Uses sample stddev (divide by N - 1) over exactly the SMA's window.
//! Lookback: window - 1.

use super::sma::{rolling_std_of_series, sma_of_series};
use super::Indicator;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    fn prefix(self) -> &'static str {
        match self {
            BollingerBand::Upper => "bb_upper",
            BollingerBand::Middle => "bb_middle",
            BollingerBand::Lower => "bb_lower",
        }
    }
}

/// All three bands, aligned to the input index.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerColumns {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    window: usize,
    k: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(window: usize, k: f64, band: BollingerBand) -> Self {
        Self {
            window,
            k,
            band,
            name: format!("{}_{window}_{k}", band.prefix()),
        }
    }

    pub fn upper(window: usize, k: f64) -> Self {
        Self::with_band(window, k, BollingerBand::Upper)
    }

    pub fn middle(window: usize, k: f64) -> Self {
        Self::with_band(window, k, BollingerBand::Middle)
    }

    pub fn lower(window: usize, k: f64) -> Self {
        Self::with_band(window, k, BollingerBand::Lower)
    }

    pub fn band(&self) -> BollingerBand {
        self.band
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let columns = bollinger_of_series(&closes, self.window, self.k);
        match self.band {
            BollingerBand::Upper => columns.upper,
            BollingerBand::Middle => columns.middle,
            BollingerBand::Lower => columns.lower,
        }
    }
}

pub fn bollinger_of_series(values: &[f64], window: usize, k: f64) -> BollingerColumns {
    let middle = sma_of_series(values, window);
    let stddev = rolling_std_of_series(values, window);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + k * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - k * s)
        .collect();

    BollingerColumns {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Bollinger::middle(3, 2.0).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_known_width() {
        // Window [10, 11, 12]: sample stddev = 1, so bands sit at 11 +/- 2.
        let columns = bollinger_of_series(&[10.0, 11.0, 12.0], 3, 2.0);
        assert_approx(columns.upper[2], 13.0, DEFAULT_EPSILON);
        assert_approx(columns.lower[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&bars);
        let middle = Bollinger::middle(3, 2.0).compute(&bars);
        let lower = Bollinger::lower(3, 2.0).compute(&bars);

        for i in 2..5 {
            let half_width = upper[i] - middle[i];
            assert_approx(middle[i] - lower[i], half_width, DEFAULT_EPSILON);
            assert!(upper[i] >= middle[i] && middle[i] >= lower[i]);
        }
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let columns = bollinger_of_series(&[100.0; 4], 3, 2.0);
        assert_approx(columns.upper[2], 100.0, DEFAULT_EPSILON);
        assert_approx(columns.lower[2], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_nan_propagation() {
        let columns = bollinger_of_series(&[10.0, 11.0, f64::NAN, 13.0], 3, 2.0);
        assert!(columns.upper[2].is_nan());
        assert!(columns.upper[3].is_nan());
    }

    #[test]
    fn bollinger_names_and_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).name(), "bb_upper_20_2");
        assert_eq!(Bollinger::lower(20, 2.5).name(), "bb_lower_20_2.5");
        assert_eq!(Bollinger::middle(20, 2.0).lookback(), 19);
        assert_eq!(Bollinger::middle(20, 2.0).band(), BollingerBand::Middle);
    }
}
