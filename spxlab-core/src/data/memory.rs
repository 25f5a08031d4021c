//! In-memory provider for tests and offline runs.
//!
//! Holds pre-built bars per (symbol, granularity) and answers requests by
//! filtering them against the requested span. Every call is counted so tests
//! can assert how many round-trips a component made.

use super::provider::{BarProvider, BarRequest, DataError, DataSource, FetchResult};
use crate::domain::{Bar, Granularity};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
pub struct MemoryProvider {
    bars: HashMap<(String, Granularity), Vec<Bar>>,
    failing: HashSet<String>,
    now: DateTime<Utc>,
    calls: AtomicUsize,
    log: Mutex<Vec<BarRequest>>,
}

impl MemoryProvider {
    /// `now` anchors relative periods so results are reproducible.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            bars: HashMap::new(),
            failing: HashSet::new(),
            now,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, granularity: Granularity, bars: Vec<Bar>) -> Self {
        self.insert(symbol, granularity, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, granularity: Granularity, bars: Vec<Bar>) {
        self.bars
            .entry((symbol.to_string(), granularity))
            .or_default()
            .extend(bars);
    }

    /// Every request for `symbol` fails with a network error.
    pub fn failing_for(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Number of fetch calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<BarRequest> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl BarProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, request: &BarRequest) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.log.lock() {
            Ok(mut log) => log.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        if self.failing.contains(&request.symbol) {
            return Err(DataError::NetworkUnreachable(format!(
                "simulated outage for {}",
                request.symbol
            )));
        }

        let Some(all) = self
            .bars
            .get(&(request.symbol.clone(), request.granularity))
        else {
            return Err(DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            });
        };

        let bars = all
            .iter()
            .filter(|b| request.span.contains(b.timestamp.instant(), self.now))
            .cloned()
            .collect();

        Ok(FetchResult {
            symbol: request.symbol.clone(),
            bars,
            exchange_zone: None,
            source: DataSource::Memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Period, Span, Timestamp};
    use chrono::{Duration, TimeZone};

    fn bar(at: DateTime<Utc>, close: f64) -> Bar {
        Bar {
            timestamp: Timestamp::Zoned(at.with_timezone(&chrono_tz::UTC)),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
        }
    }

    #[test]
    fn filters_by_range_and_counts_calls() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let day = Utc.with_ymd_and_hms(2024, 6, 7, 14, 0, 0).unwrap();
        let provider = MemoryProvider::new(now).with_bars(
            "^GSPC",
            Granularity::OneMinute,
            vec![bar(day, 1.0), bar(day + Duration::days(1), 2.0)],
        );

        let req = BarRequest::new(
            "^GSPC",
            Granularity::OneMinute,
            Span::Range {
                start: Utc.with_ymd_and_hms(2024, 6, 7, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
            },
        );
        let fetched = provider.fetch(&req).unwrap();
        assert_eq!(fetched.bars.len(), 1);
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.requests()[0], req);
    }

    #[test]
    fn unknown_symbol_and_outage_are_errors() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let provider = MemoryProvider::new(now).failing_for("DOWN");
        let span = Span::Period(Period::OneMonth);
        assert!(matches!(
            provider.fetch(&BarRequest::new("NOPE", Granularity::OneDay, span)),
            Err(DataError::SymbolNotFound { .. })
        ));
        assert!(matches!(
            provider.fetch(&BarRequest::new("DOWN", Granularity::OneDay, span)),
            Err(DataError::NetworkUnreachable(_))
        ));
        assert_eq!(provider.calls(), 2);
    }
}
