//! Pipeline facade: the operations a presentation layer consumes.
//!
//! Owns the configured bar source and display zone. Everything here returns
//! plain tables; rendering is the caller's job.

use crate::config::{ConfigError, PipelineConfig};
use crate::data::{normalize, BarProvider, BarSource, DatedSeries, FallbackRetriever};
use crate::domain::{BarSeries, Granularity, Period, Span};
use crate::indicators::{self, AugmentedSeries, IndicatorSpec};
use crate::metrics::{self, HistogramBin, KeyMetrics};
use crate::summary::{build_summary, DailySummaryRow};
use chrono::NaiveDate;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data returned for {symbol} ({period})")]
    NoData { symbol: String, period: Period },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Return statistics over the primary series.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStats {
    pub returns: Vec<f64>,
    pub rolling_volatility: Vec<f64>,
    pub histogram: Vec<HistogramBin>,
}

pub struct Pipeline<P> {
    config: PipelineConfig,
    zone: Tz,
    source: BarSource<P>,
}

impl<P: BarProvider> Pipeline<P> {
    /// Validates `config` before anything is fetched.
    pub fn new(config: PipelineConfig, provider: P) -> Result<Self, PipelineError> {
        config.validate()?;
        let zone = config.zone()?;
        Ok(Self {
            config,
            zone,
            source: BarSource::new(provider),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn provider(&self) -> &P {
        self.source.provider()
    }

    /// Bars for a relative period, in the display zone. Empty on any failure.
    pub fn get_bars(&self, symbol: &str, granularity: Granularity, period: Period) -> BarSeries {
        if let (Some(limit), Some(wanted)) = (granularity.max_lookback(), period.approx_duration()) {
            if wanted > limit {
                tracing::warn!(
                    symbol,
                    granularity = %granularity,
                    period = %period,
                    limit_days = limit.num_days(),
                    "period exceeds provider lookback for this interval, expect partial or no data"
                );
            }
        }

        let raw = self.source.fetch(symbol, granularity, Span::Period(period));
        normalize(&raw, &self.config.display_timezone).series
    }

    /// One day of bars, stepping back up to the configured budget when `date` is empty.
    pub fn get_bars_for_date(
        &self,
        symbol: &str,
        date: NaiveDate,
        granularity: Granularity,
    ) -> Option<DatedSeries> {
        self.retriever().fetch_with_fallback(
            symbol,
            date,
            granularity,
            self.config.fallback.max_days_back,
        )
    }

    pub fn compute_indicators(&self, series: &BarSeries, specs: &[IndicatorSpec]) -> AugmentedSeries {
        indicators::compute_indicators(series, specs)
    }

    /// Every indicator from the config.
    pub fn configured_indicators(&self, series: &BarSeries) -> AugmentedSeries {
        indicators::compute_indicators(series, &self.config.indicators.specs())
    }

    /// Daily summary over the last `lookback_days` days of `series`.
    pub fn build_daily_summary(&self, series: &BarSeries, lookback_days: usize) -> Vec<DailySummaryRow> {
        let mut options = self.config.summary_options();
        options.lookback_days = lookback_days;
        build_summary(series, &self.retriever(), &options)
    }

    pub fn key_metrics(&self, series: &BarSeries) -> Option<KeyMetrics> {
        metrics::key_metrics(series)
    }

    pub fn return_stats(&self, series: &BarSeries) -> ReturnStats {
        let analytics = &self.config.analytics;
        let returns = metrics::daily_returns(series);
        let rolling_volatility = metrics::rolling_volatility(
            &returns,
            analytics.volatility_window,
            analytics.periods_per_year,
        );
        let histogram = metrics::histogram(&returns, analytics.histogram_bins);
        ReturnStats {
            returns,
            rolling_volatility,
            histogram,
        }
    }

    /// Daily bars for the configured symbol and period.
    ///
    /// The one failure surfaced to callers: nothing came back at all.
    pub fn primary_series(&self) -> Result<BarSeries, PipelineError> {
        let series = self.get_bars(&self.config.symbol, Granularity::OneDay, self.config.period);
        if series.is_empty() {
            return Err(PipelineError::NoData {
                symbol: self.config.symbol.clone(),
                period: self.config.period,
            });
        }
        Ok(series)
    }

    fn retriever(&self) -> FallbackRetriever<'_, P> {
        FallbackRetriever::new(&self.source, self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryProvider;
    use crate::domain::{Bar, Timestamp};
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap()
    }

    fn daily(days: i64) -> Vec<Bar> {
        (0..days)
            .map(|i| {
                let close = 5000.0 + i as f64;
                Bar {
                    timestamp: Timestamp::Zoned(
                        (now() - Duration::days(days - 1 - i)).with_timezone(&chrono_tz::UTC),
                    ),
                    open: close - 2.0,
                    high: close + 5.0,
                    low: close - 5.0,
                    close,
                    volume: 1_000_000,
                }
            })
            .collect()
    }

    #[test]
    fn primary_series_is_normalized() {
        let provider = MemoryProvider::new(now()).with_bars("^GSPC", Granularity::OneDay, daily(40));
        let pipeline = Pipeline::new(PipelineConfig::default(), provider).unwrap();
        let series = pipeline.primary_series().unwrap();
        assert_eq!(series.len(), 40);
        assert!(series
            .bars
            .iter()
            .all(|b| b.timestamp.zone() == Some(chrono_tz::America::New_York)));
    }

    #[test]
    fn primary_series_empty_is_an_error() {
        let provider = MemoryProvider::new(now()).failing_for("^GSPC");
        let pipeline = Pipeline::new(PipelineConfig::default(), provider).unwrap();
        assert!(matches!(
            pipeline.primary_series(),
            Err(PipelineError::NoData { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig {
            display_timezone: "Nowhere/Special".into(),
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(config, MemoryProvider::new(now()));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn return_stats_align_with_returns() {
        let provider = MemoryProvider::new(now()).with_bars("^GSPC", Granularity::OneDay, daily(40));
        let pipeline = Pipeline::new(PipelineConfig::default(), provider).unwrap();
        let series = pipeline.primary_series().unwrap();
        let stats = pipeline.return_stats(&series);
        assert_eq!(stats.returns.len(), 39);
        assert_eq!(stats.rolling_volatility.len(), 39);
        assert!(stats.rolling_volatility[28].is_nan());
        assert!(!stats.rolling_volatility[29].is_nan());
        assert_eq!(stats.histogram.iter().map(|b| b.count).sum::<usize>(), 39);
    }
}
