//! Config loading from disk.

use spxlab_core::domain::{Granularity, Period};
use spxlab_core::{ConfigError, PipelineConfig};
use std::io::Write;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_full_config() {
    let file = write_config(
        r#"
symbol = "^NDX"
display_timezone = "Europe/London"
period = "2y"

[provider]
timeout_secs = 5

[fallback]
max_days_back = 3

[summary]
lookback_days = 10
intraday = "4h"
last_window = 3
workers = 2

[indicators]
ma_windows = [10, 30]
rsi_window = 7
bollinger_window = 10
bollinger_k = 1.5
ema_span = 12
macd_fast = 8
macd_slow = 21
macd_signal = 5

[analytics]
volatility_window = 20
periods_per_year = 365.0
histogram_bins = 25
"#,
    );
    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.symbol, "^NDX");
    assert_eq!(config.zone().unwrap(), chrono_tz::Europe::London);
    assert_eq!(config.period, Period::TwoYears);

    let options = config.summary_options();
    assert_eq!(options.lookback_days, 10);
    assert_eq!(options.intraday, Granularity::FourHour);
    assert_eq!(options.last_window, 3);
    assert_eq!(options.max_days_back, 3);
    assert_eq!(options.workers, 2);

    assert_eq!(config.indicators.specs().len(), 6);
    assert_eq!(config.analytics.histogram_bins, 25);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let file = write_config(
        r#"
[summary]
last_window = 1
"#,
    );
    let err = PipelineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn saved_config_loads_back() {
    let mut config = PipelineConfig::default();
    config.symbol = "^DJI".into();
    config.summary.workers = 3;
    let file = write_config(&config.to_toml().unwrap());
    assert_eq!(PipelineConfig::load(file.path()).unwrap(), config);
}
