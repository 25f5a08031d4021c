//! Domain types: bars, timestamps, series, granularities.

pub mod bar;
pub mod granularity;
pub mod series;

pub use bar::{Bar, Timestamp};
pub use granularity::{Granularity, ParseTokenError, Period, Span};
pub use series::BarSeries;
