//! Sampling granularities, lookback periods and request spans.
//!
//! Tokens are passed to the provider verbatim; the core never reinterprets them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} token: '{token}'")]
pub struct ParseTokenError {
    pub kind: &'static str,
    pub token: String,
}

/// Bar sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [
        Granularity::OneMinute,
        Granularity::FourHour,
        Granularity::OneDay,
    ];

    /// Provider interval token.
    pub fn token(self) -> &'static str {
        match self {
            Granularity::OneMinute => "1m",
            Granularity::FourHour => "4h",
            Granularity::OneDay => "1d",
        }
    }

    /// Trailing window the provider retains for this granularity.
    /// `None` means the full history is available.
    pub fn max_lookback(self) -> Option<Duration> {
        match self {
            Granularity::OneMinute => Some(Duration::days(30)),
            Granularity::FourHour => Some(Duration::days(730)),
            Granularity::OneDay => None,
        }
    }

    pub fn is_intraday(self) -> bool {
        !matches!(self, Granularity::OneDay)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Granularity {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1-minute" | "1min" => Ok(Granularity::OneMinute),
            "4h" | "4-hour" => Ok(Granularity::FourHour),
            "1d" | "1-day" | "daily" => Ok(Granularity::OneDay),
            _ => Err(ParseTokenError {
                kind: "granularity",
                token: s.to_string(),
            }),
        }
    }
}

/// Relative lookback window ending now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Human-readable label, as shown in period pickers.
    pub fn label(self) -> &'static str {
        match self {
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Months",
            Period::SixMonths => "6 Months",
            Period::OneYear => "1 Year",
            Period::TwoYears => "2 Years",
            Period::FiveYears => "5 Years",
            Period::Max => "Max",
        }
    }

    /// Approximate calendar length, `None` for `Max`.
    pub fn approx_duration(self) -> Option<Duration> {
        match self {
            Period::OneMonth => Some(Duration::days(31)),
            Period::ThreeMonths => Some(Duration::days(92)),
            Period::SixMonths => Some(Duration::days(183)),
            Period::OneYear => Some(Duration::days(366)),
            Period::TwoYears => Some(Duration::days(731)),
            Period::FiveYears => Some(Duration::days(1827)),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Period {
    type Err = ParseTokenError;

    /// Accepts either the provider token (`6mo`) or the label (`6 Months`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.token().eq_ignore_ascii_case(wanted) || p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseTokenError {
                kind: "period",
                token: s.to_string(),
            })
    }
}

/// What window of history a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Relative lookback ending now.
    Period(Period),
    /// Explicit half-open window `[start, end)`.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Span {
    pub fn contains(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            Span::Period(period) => match period.approx_duration() {
                Some(len) => instant >= now - len && instant <= now,
                None => instant <= now,
            },
            Span::Range { start, end } => instant >= start && instant < end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Period(p) => write!(f, "period={p}"),
            Span::Range { start, end } => write!(f, "range=[{start}, {end})"),
        }
    }
}
