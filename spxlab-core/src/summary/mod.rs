//! Daily summary: resampling plus per-day intraday detail.

pub mod builder;
pub mod resample;

pub use builder::{
    build_summary, daily_changes, intraday_delta, last_window_delta, weekday_name, DailyChange,
    DailySummaryRow, IntradayDelta, SummaryOptions, Trend, MAX_WORKERS,
};
pub use resample::{resample_daily, DailyBar};
