//! Bar source adapter.
//!
//! Sits on top of a `BarProvider` and turns every failure into an empty
//! series. Callers treat "network failed" and "no data for this window" the
//! same way: a recoverable absence, never a fatal error. No retries here.

use super::provider::{BarProvider, BarRequest};
use crate::domain::{BarSeries, Granularity, Span};

pub struct BarSource<P> {
    provider: P,
}

impl<P: BarProvider> BarSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch a canonical (sorted, de-duplicated) series, or an empty one.
    pub fn fetch(&self, symbol: &str, granularity: Granularity, span: Span) -> BarSeries {
        let request = BarRequest::new(symbol, granularity, span);
        match self.provider.fetch(&request) {
            Ok(result) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    symbol,
                    granularity = %granularity,
                    span = %span,
                    bars = result.bars.len(),
                    exchange_zone = ?result.exchange_zone,
                    "fetched bars"
                );
                BarSeries::new(symbol, granularity, result.bars)
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    symbol,
                    granularity = %granularity,
                    span = %span,
                    error = %err,
                    "bar fetch failed, treating as no data"
                );
                BarSeries::empty(symbol, granularity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryProvider;
    use crate::domain::{Bar, Period, Timestamp};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn provider_error_becomes_empty_series() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let source = BarSource::new(MemoryProvider::new(now).failing_for("^GSPC"));
        let series = source.fetch("^GSPC", Granularity::OneDay, Span::Period(Period::OneYear));
        assert!(series.is_empty());
        assert_eq!(series.symbol, "^GSPC");
        assert_eq!(source.provider().calls(), 1);
    }

    #[test]
    fn fetched_bars_are_canonicalized() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let mk = |days: i64, close: f64| Bar {
            timestamp: Timestamp::Zoned((now - Duration::days(days)).with_timezone(&chrono_tz::UTC)),
            open: close,
            high: close,
            low: close,
            close,
            volume: 5,
        };
        let provider = MemoryProvider::new(now).with_bars(
            "^GSPC",
            Granularity::OneDay,
            vec![mk(1, 3.0), mk(3, 1.0), mk(2, 2.0), mk(3, 1.5)],
        );
        let series = BarSource::new(provider).fetch(
            "^GSPC",
            Granularity::OneDay,
            Span::Period(Period::OneMonth),
        );
        assert!(series.is_canonical());
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }
}
