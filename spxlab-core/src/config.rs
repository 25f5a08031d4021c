//! Pipeline configuration.
//!
//! Loaded from TOML. Every section and key is optional; anything missing takes
//! the dashboard default (S&P 500, New York time, one year of daily bars).

use crate::data::{resolve_zone, DEFAULT_MAX_DAYS_BACK};
use crate::domain::{Granularity, Period};
use crate::indicators::{IndicatorSpec, MacdParams};
use crate::metrics::TRADING_DAYS_PER_YEAR;
use crate::summary::{SummaryOptions, MAX_WORKERS};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub symbol: String,
    /// IANA zone used for display and for intraday day boundaries.
    pub display_timezone: String,
    pub period: Period,
    pub provider: ProviderConfig,
    pub fallback: FallbackConfig,
    pub summary: SummaryConfig,
    pub indicators: IndicatorConfig,
    pub analytics: AnalyticsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbol: "^GSPC".into(),
            display_timezone: "America/New_York".into(),
            period: Period::default(),
            provider: ProviderConfig::default(),
            fallback: FallbackConfig::default(),
            summary: SummaryConfig::default(),
            indicators: IndicatorConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub max_days_back: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_days_back: DEFAULT_MAX_DAYS_BACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub lookback_days: usize,
    pub intraday: Granularity,
    pub last_window: usize,
    pub workers: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            intraday: Granularity::OneMinute,
            last_window: 5,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma_windows: Vec<usize>,
    pub rsi_window: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
    pub ema_span: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        let macd = MacdParams::default();
        Self {
            ma_windows: vec![20, 50, 200],
            rsi_window: 14,
            bollinger_window: 20,
            bollinger_k: 2.0,
            ema_span: 20,
            macd_fast: macd.fast,
            macd_slow: macd.slow,
            macd_signal: macd.signal,
        }
    }
}

impl IndicatorConfig {
    pub fn macd(&self) -> MacdParams {
        MacdParams {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        }
    }

    /// Every configured indicator, moving averages first.
    pub fn specs(&self) -> Vec<IndicatorSpec> {
        let mut specs: Vec<IndicatorSpec> = self
            .ma_windows
            .iter()
            .map(|&window| IndicatorSpec::Sma { window })
            .collect();
        specs.push(IndicatorSpec::Rsi {
            window: self.rsi_window,
        });
        specs.push(IndicatorSpec::Bollinger {
            window: self.bollinger_window,
            k: self.bollinger_k,
        });
        specs.push(IndicatorSpec::Ema {
            span: self.ema_span,
        });
        specs.push(IndicatorSpec::Macd {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        });
        specs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub volatility_window: usize,
    pub periods_per_year: f64,
    pub histogram_bins: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            volatility_window: 30,
            periods_per_year: TRADING_DAYS_PER_YEAR,
            histogram_bins: 50,
        }
    }
}

impl PipelineConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }

    pub fn zone(&self) -> Result<Tz, ConfigError> {
        resolve_zone(&self.display_timezone).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            lookback_days: self.summary.lookback_days,
            intraday: self.summary.intraday,
            last_window: self.summary.last_window,
            max_days_back: self.fallback.max_days_back,
            workers: self.summary.workers,
        }
    }

    /// Reject values no component can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.symbol.trim().is_empty() {
            return invalid("symbol must not be empty".into());
        }
        self.zone()?;
        if self.provider.timeout_secs == 0 {
            return invalid("provider.timeout_secs must be positive".into());
        }
        if self.summary.lookback_days == 0 {
            return invalid("summary.lookback_days must be positive".into());
        }
        if !self.summary.intraday.is_intraday() {
            return invalid(format!(
                "summary.intraday must be an intraday interval, got {}",
                self.summary.intraday
            ));
        }
        if self.summary.workers > MAX_WORKERS {
            return invalid(format!(
                "summary.workers must be at most {MAX_WORKERS}, got {}",
                self.summary.workers
            ));
        }
        if self.summary.last_window < 2 {
            return invalid(format!(
                "summary.last_window must be at least 2, got {}",
                self.summary.last_window
            ));
        }

        let ind = &self.indicators;
        if let Some(w) = ind.ma_windows.iter().find(|&&w| w == 0) {
            return invalid(format!("indicators.ma_windows contains {w}"));
        }
        for (name, value) in [
            ("rsi_window", ind.rsi_window),
            ("bollinger_window", ind.bollinger_window),
            ("ema_span", ind.ema_span),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
        ] {
            if value == 0 {
                return invalid(format!("indicators.{name} must be positive"));
            }
        }
        if !(ind.bollinger_k.is_finite() && ind.bollinger_k >= 0.0) {
            return invalid(format!(
                "indicators.bollinger_k must be a non-negative number, got {}",
                ind.bollinger_k
            ));
        }

        if self.analytics.volatility_window < 2 {
            return invalid("analytics.volatility_window must be at least 2".into());
        }
        if self.analytics.periods_per_year.is_nan() || self.analytics.periods_per_year <= 0.0 {
            return invalid("analytics.periods_per_year must be positive".into());
        }
        Ok(())
    }
}
