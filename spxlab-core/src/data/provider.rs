//! Data provider trait and structured error types.
//!
//! The BarProvider trait abstracts over market-data sources (Yahoo Finance,
//! in-memory fixtures) so the pipeline can be driven without a network.

use crate::domain::{Bar, Granularity, Span};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One provider round-trip: symbol, sampling interval and window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarRequest {
    pub symbol: String,
    pub granularity: Granularity,
    pub span: Span,
}

impl BarRequest {
    pub fn new(symbol: impl Into<String>, granularity: Granularity, span: Span) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            span,
        }
    }
}

/// Structured error types for provider operations.
///
/// None of these escape the bar source: they are logged and folded into an
/// empty series there.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("unsupported request: {0}")]
    Unsupported(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful provider fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<Bar>,
    /// Exchange zone reported by the provider, if any.
    pub exchange_zone: Option<Tz>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Memory,
}

/// Trait for bar providers.
///
/// Implementations make exactly one attempt per call; retrying is the
/// caller's business.
pub trait BarProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(&self, request: &BarRequest) -> Result<FetchResult, DataError>;
}

impl<P: BarProvider + ?Sized> BarProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, request: &BarRequest) -> Result<FetchResult, DataError> {
        (**self).fetch(request)
    }
}
