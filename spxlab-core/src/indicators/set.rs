//! Named indicator columns and on-demand computation over a series.

use super::{Bollinger, Ema, Indicator, Macd, MacdLine, MacdParams, Rsi, Sma};
use crate::domain::BarSeries;
use serde::{Deserialize, Serialize};

/// Indicator kind plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorSpec {
    Sma { window: usize },
    Ema { span: usize },
    Rsi { window: usize },
    Bollinger { window: usize, k: f64 },
    Macd { fast: usize, slow: usize, signal: usize },
}

impl IndicatorSpec {
    /// Concrete indicators, one per output column.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        match *self {
            IndicatorSpec::Sma { window } => vec![Box::new(Sma::new(window))],
            IndicatorSpec::Ema { span } => vec![Box::new(Ema::new(span))],
            IndicatorSpec::Rsi { window } => vec![Box::new(Rsi::new(window))],
            IndicatorSpec::Bollinger { window, k } => vec![
                Box::new(Bollinger::upper(window, k)),
                Box::new(Bollinger::middle(window, k)),
                Box::new(Bollinger::lower(window, k)),
            ],
            IndicatorSpec::Macd { fast, slow, signal } => {
                let params = MacdParams { fast, slow, signal };
                vec![
                    Box::new(Macd::new(params, MacdLine::Macd)),
                    Box::new(Macd::new(params, MacdLine::Signal)),
                    Box::new(Macd::new(params, MacdLine::Histogram)),
                ]
            }
        }
    }

    /// Column names this spec produces, in output order.
    pub fn column_names(&self) -> Vec<String> {
        self.indicators()
            .iter()
            .map(|i| i.name().to_string())
            .collect()
    }

    /// MA 20/50/200, RSI 14 and Bollinger 20/2: the price-chart overlay set.
    pub fn dashboard_defaults() -> Vec<IndicatorSpec> {
        vec![
            IndicatorSpec::Sma { window: 20 },
            IndicatorSpec::Sma { window: 50 },
            IndicatorSpec::Sma { window: 200 },
            IndicatorSpec::Rsi { window: 14 },
            IndicatorSpec::Bollinger { window: 20, k: 2.0 },
        ]
    }
}

/// Ordered collection of named columns aligned to one series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    columns: Vec<(String, Vec<f64>)>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named column, replacing any column of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Value of `name` at `index`; `None` if the column or index is missing.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.column(name).and_then(|v| v.get(index).copied())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A series snapshot with derived columns attached.
#[derive(Debug, Clone)]
pub struct AugmentedSeries {
    pub series: BarSeries,
    pub indicators: IndicatorSet,
}

impl AugmentedSeries {
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.indicators.get(name, index)
    }
}

/// Compute every column requested by `specs` over a copy of `series`.
pub fn compute_indicators(series: &BarSeries, specs: &[IndicatorSpec]) -> AugmentedSeries {
    let mut indicators = IndicatorSet::new();
    for spec in specs {
        for indicator in spec.indicators() {
            indicators.insert(indicator.name(), indicator.compute(&series.bars));
        }
    }
    AugmentedSeries {
        series: series.clone(),
        indicators,
    }
}
