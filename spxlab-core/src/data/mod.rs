//! Bar retrieval: providers, the failure-absorbing bar source, timezone
//! normalization and date-fallback retrieval.

pub mod fallback;
pub mod memory;
pub mod provider;
pub mod source;
pub mod timezone;
pub mod yahoo;

pub use fallback::{DatedSeries, FallbackRetriever, DEFAULT_MAX_DAYS_BACK};
pub use memory::MemoryProvider;
pub use provider::{BarProvider, BarRequest, DataError, DataSource, FetchResult};
pub use source::BarSource;
pub use timezone::{day_bounds, normalize, normalize_to, resolve_zone, NormalizeWarning, Normalized};
pub use yahoo::YahooProvider;
