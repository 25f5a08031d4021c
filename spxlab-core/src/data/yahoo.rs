//! Yahoo Finance data provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart API at any supported interval,
//! for either a relative `range` or an explicit `period1`/`period2` window.
//!
//! One attempt per call. Yahoo has no official API and is subject to
//! unannounced format changes; every failure is reported as a `DataError`.

use super::provider::{BarProvider, BarRequest, DataError, DataSource, FetchResult};
use crate::domain::{Bar, Span, Timestamp};
use chrono_tz::Tz;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart/";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base: Url,
}

impl YahooProvider {
    /// Build a provider whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        Self::with_client(
            reqwest::blocking::Client::builder().timeout(timeout),
            CHART_BASE,
        )
    }

    /// Build a provider from a preconfigured client against another chart endpoint.
    pub fn with_client(
        builder: reqwest::blocking::ClientBuilder,
        base: &str,
    ) -> Result<Self, DataError> {
        let base = Url::parse(base)
            .map_err(|e| DataError::Other(format!("invalid chart base url {base}: {e}")))?;
        let client = builder
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    /// Build the chart API URL for a request.
    fn chart_url(&self, request: &BarRequest) -> Result<Url, DataError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DataError::Other("chart base url cannot hold a path".into()))?
            .pop_if_empty()
            .push(&request.symbol);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("interval", request.granularity.token());
            match request.span {
                Span::Period(period) => {
                    query.append_pair("range", period.token());
                }
                Span::Range { start, end } => {
                    query.append_pair("period1", &start.timestamp().to_string());
                    query.append_pair("period2", &end.timestamp().to_string());
                }
            }
            query.append_pair("includePrePost", "false");
        }
        Ok(url)
    }

    fn chart_error(symbol: &str, err: ChartError) -> DataError {
        match err.code.as_str() {
            "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            "Unprocessable Entity" | "Bad Request" => {
                DataError::Unsupported(format!("{}: {}", err.code, err.description))
            }
            _ => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        }
    }

    /// Parse the chart API response into bars stamped as UTC instants.
    ///
    /// Rows with no close are dropped (halts, holidays, the still-forming
    /// minute); other missing prices fall back to the close.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<FetchResult, DataError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (_, Some(err)) => return Err(Self::chart_error(symbol, err)),
            (Some(result), None) => result,
            (None, None) => {
                return Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let exchange_zone = data
            .meta
            .as_ref()
            .and_then(|m| m.exchange_timezone_name.as_deref())
            .and_then(|name| name.parse::<Tz>().ok());

        // A window with no trading has no timestamp array at all.
        let Some(timestamps) = data.timestamp else {
            return Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: Vec::new(),
                exchange_zone,
                source: DataSource::YahooFinance,
            });
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let timestamp = Timestamp::from_unix(ts, chrono_tz::UTC).ok_or_else(|| {
                DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;

            bars.push(Bar {
                timestamp,
                open: quote.open.get(i).copied().flatten().unwrap_or(close),
                high: quote.high.get(i).copied().flatten().unwrap_or(close),
                low: quote.low.get(i).copied().flatten().unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            exchange_zone,
            source: DataSource::YahooFinance,
        })
    }

    fn classify_transport(symbol: &str, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout(format!("{symbol}: {e}"))
        } else if e.is_connect() || e.is_request() {
            DataError::NetworkUnreachable(format!("{symbol}: {e}"))
        } else {
            DataError::Other(format!("{symbol}: {e}"))
        }
    }
}

impl BarProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, request: &BarRequest) -> Result<FetchResult, DataError> {
        let symbol = request.symbol.as_str();
        let url = self.chart_url(request)?;

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::classify_transport(symbol, e))?;
        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        // Yahoo answers 400/422 with a chart.error body for bad interval/range
        // combinations; fall through to the body parser for those.
        let parse_body = status.is_success()
            || status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY;
        if !parse_body {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            if e.is_timeout() {
                DataError::Timeout(format!("{symbol}: {e}"))
            } else {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            }
        })?;

        Self::parse_response(symbol, chart)
    }
}
