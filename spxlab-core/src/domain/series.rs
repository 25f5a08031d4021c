//! BarSeries: an ordered run of bars for one symbol at one granularity.

use super::bar::{Bar, Timestamp};
use super::granularity::Granularity;
use serde::Serialize;

/// Time-indexed bars, strictly increasing by instant.
///
/// Derived views (normalized, resampled, augmented) are always new values;
/// a series is never edited in place once handed to a consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub symbol: String,
    pub granularity: Granularity,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, sorting by instant and dropping duplicate instants
    /// (the first occurrence wins).
    pub fn new(symbol: impl Into<String>, granularity: Granularity, bars: Vec<Bar>) -> Self {
        let mut series = Self {
            symbol: symbol.into(),
            granularity,
            bars,
        };
        series.canonicalize();
        series
    }

    pub fn empty(symbol: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            bars: Vec::new(),
        }
    }

    fn canonicalize(&mut self) {
        self.bars.sort_by_key(|b| b.timestamp);
        self.bars.dedup_by_key(|b| b.timestamp);
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Strictly increasing, unique instants.
    pub fn is_canonical(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    /// New series holding the last `n` bars.
    pub fn tail(&self, n: usize) -> BarSeries {
        let start = self.bars.len().saturating_sub(n);
        BarSeries {
            symbol: self.symbol.clone(),
            granularity: self.granularity,
            bars: self.bars[start..].to_vec(),
        }
    }
}
