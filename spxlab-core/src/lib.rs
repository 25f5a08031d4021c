//! SPX Lab Core: market-data retrieval and technical analysis for an equity index.
//!
//! This crate contains everything below the presentation layer:
//! - Domain types (bars, timestamps, series, granularities, periods)
//! - Bar source adapter over pluggable providers (Yahoo chart API, in-memory)
//! - Timezone normalization and bounded date-fallback retrieval
//! - Indicator engine (SMA, EMA, RSI, Bollinger Bands, MACD)
//! - Daily summary builder with per-day intraday deltas
//! - Key metrics and return statistics
//! - TOML configuration and the pipeline facade

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod metrics;
pub mod pipeline;
pub mod summary;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{Pipeline, PipelineError, ReturnStats};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with summary workers are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Span>();
        require_sync::<domain::Span>();

        // Data layer
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::BarSource<data::MemoryProvider>>();
        require_sync::<data::BarSource<data::MemoryProvider>>();
        require_send::<data::BarSource<data::YahooProvider>>();
        require_sync::<data::BarSource<data::YahooProvider>>();
        require_send::<data::DatedSeries>();
        require_sync::<data::DatedSeries>();

        // Outputs
        require_send::<indicators::AugmentedSeries>();
        require_sync::<indicators::AugmentedSeries>();
        require_send::<summary::DailySummaryRow>();
        require_sync::<summary::DailySummaryRow>();
        require_send::<metrics::KeyMetrics>();
        require_sync::<metrics::KeyMetrics>();

        require_send::<Pipeline<data::MemoryProvider>>();
        require_sync::<Pipeline<data::MemoryProvider>>();
    }
}
