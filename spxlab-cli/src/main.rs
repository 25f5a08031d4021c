//! SPX Lab CLI: bars, indicators, daily summary and key metrics.
//!
//! Commands:
//! - `bars`: recent bars for the configured symbol, in the display zone
//! - `indicators`: moving averages, RSI, Bollinger Bands, EMA and MACD
//! - `summary`: daily summary with last-window intraday deltas, optional CSV
//! - `metrics`: key metrics, rolling volatility and the returns distribution
//! - `intraday`: one day of intraday bars with date fallback

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use spxlab_core::data::YahooProvider;
use spxlab_core::domain::{BarSeries, Granularity, Period};
use spxlab_core::indicators::IndicatorSpec;
use spxlab_core::summary::{DailySummaryRow, Trend};
use spxlab_core::{Pipeline, PipelineConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spxlab",
    about = "SPX Lab CLI: index bars, technical indicators and daily summaries"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Symbol override (e.g., ^GSPC, ^NDX).
    #[arg(long, global = true)]
    symbol: Option<String>,

    /// Period override: 1mo, 3mo, 6mo, 1y, 2y, 5y, max (or "1 Year" etc.).
    #[arg(long, global = true)]
    period: Option<Period>,

    /// Only log errors.
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the most recent bars.
    Bars {
        /// Bar interval: 1m, 4h, 1d.
        #[arg(long, default_value = "1d")]
        granularity: Granularity,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Compute technical indicators over the primary daily series.
    Indicators {
        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// MACD fast span.
        #[arg(long, value_parser = clap::value_parser!(u16).range(5..=20))]
        macd_fast: Option<u16>,

        /// MACD slow span.
        #[arg(long, value_parser = clap::value_parser!(u16).range(20..=50))]
        macd_slow: Option<u16>,

        /// MACD signal span.
        #[arg(long, value_parser = clap::value_parser!(u16).range(5..=15))]
        macd_signal: Option<u16>,
    },
    /// Daily summary with last-window intraday deltas.
    Summary {
        /// Number of most recent days to include.
        #[arg(long)]
        lookback_days: Option<usize>,

        /// Parallel intraday fetch workers (1 = sequential).
        #[arg(long)]
        workers: Option<usize>,

        /// Write the table as CSV to this file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Key metrics, rolling volatility and returns distribution.
    Metrics {
        /// Histogram bucket count.
        #[arg(long)]
        bins: Option<usize>,
    },
    /// One day of intraday bars, stepping back when the day has none.
    Intraday {
        /// Requested date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Bar interval: 1m, 4h, 1d.
        #[arg(long, default_value = "1m")]
        granularity: Granularity,

        /// Maximum days to step back.
        #[arg(long)]
        max_days_back: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(symbol) = cli.symbol {
        config.symbol = symbol;
    }
    if let Some(period) = cli.period {
        config.period = period;
    }
    tracing::debug!(
        symbol = %config.symbol,
        period = %config.period,
        zone = %config.display_timezone,
        "configuration resolved"
    );

    match cli.command {
        Commands::Bars { granularity, rows } => run_bars(config, granularity, rows),
        Commands::Indicators {
            rows,
            macd_fast,
            macd_slow,
            macd_signal,
        } => {
            if let Some(v) = macd_fast {
                config.indicators.macd_fast = usize::from(v);
            }
            if let Some(v) = macd_slow {
                config.indicators.macd_slow = usize::from(v);
            }
            if let Some(v) = macd_signal {
                config.indicators.macd_signal = usize::from(v);
            }
            run_indicators(config, rows)
        }
        Commands::Summary {
            lookback_days,
            workers,
            csv,
        } => {
            if let Some(days) = lookback_days {
                config.summary.lookback_days = days;
            }
            if let Some(w) = workers {
                config.summary.workers = w;
            }
            run_summary(config, csv.as_deref())
        }
        Commands::Metrics { bins } => {
            if let Some(b) = bins {
                config.analytics.histogram_bins = b;
            }
            run_metrics(config)
        }
        Commands::Intraday {
            date,
            granularity,
            max_days_back,
        } => {
            if let Some(days) = max_days_back {
                config.fallback.max_days_back = days;
            }
            run_intraday(config, date.as_deref(), granularity)
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings, or errors only with `--quiet`.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_pipeline(config: PipelineConfig) -> Result<Pipeline<YahooProvider>> {
    let provider = YahooProvider::new(config.provider.timeout())?;
    Ok(Pipeline::new(config, provider)?)
}

fn run_bars(config: PipelineConfig, granularity: Granularity, rows: usize) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let cfg = pipeline.config();
    let series = pipeline.get_bars(&cfg.symbol, granularity, cfg.period);
    if series.is_empty() {
        bail!(
            "no {granularity} bars for {} over {}; check the symbol or your connection",
            cfg.symbol,
            cfg.period.label()
        );
    }

    println!(
        "{}: {} bars ({}, {})",
        series.symbol,
        series.len(),
        granularity,
        cfg.period.label()
    );
    print_bars(&series.tail(rows));
    Ok(())
}

fn print_bars(series: &BarSeries) {
    println!(
        "{:<26} {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Time", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(85));
    for bar in &series.bars {
        println!(
            "{:<26} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14}",
            bar.timestamp.to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
}

fn run_indicators(config: PipelineConfig, rows: usize) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let series = pipeline.primary_series()?;
    let augmented = pipeline.configured_indicators(&series);

    let names: Vec<&str> = augmented.indicators.names().collect();
    print!("{:<12} {:>10}", "Date", "Close");
    for name in &names {
        print!(" {:>18}", name);
    }
    println!();
    println!("{}", "-".repeat(23 + 19 * names.len()));

    let start = series.len().saturating_sub(rows);
    for (i, bar) in series.bars.iter().enumerate().skip(start) {
        print!("{:<12} {:>10.2}", bar.timestamp.local_date(), bar.close);
        for name in &names {
            print!(" {:>18}", format_value(augmented.value(name, i)));
        }
        println!();
    }

    let rsi_name = IndicatorSpec::Rsi {
        window: pipeline.config().indicators.rsi_window,
    }
    .column_names();
    if let Some(rsi) = rsi_name
        .first()
        .and_then(|n| augmented.value(n, series.len() - 1))
        .filter(|v| !v.is_nan())
    {
        let zone = if rsi >= 70.0 {
            "overbought"
        } else if rsi <= 30.0 {
            "oversold"
        } else {
            "neutral"
        };
        println!();
        println!("Latest RSI: {rsi:.2} ({zone})");
    }
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.2}"),
        _ => "-".into(),
    }
}

/// CSV shape of one summary row.
#[derive(Serialize)]
struct SummaryRecord {
    date: NaiveDate,
    day: &'static str,
    open: String,
    close: String,
    change_pct: String,
    trend: String,
    last_window_change: String,
    last_window_trend: Trend,
    intraday_date: Option<NaiveDate>,
}

impl From<&DailySummaryRow> for SummaryRecord {
    fn from(row: &DailySummaryRow) -> Self {
        Self {
            date: row.date,
            day: row.weekday,
            open: format!("{:.2}", row.open),
            close: format!("{:.2}", row.close),
            change_pct: row.change_pct.map(|c| format!("{c:.2}")).unwrap_or_default(),
            trend: row.trend.map(|t| t.to_string()).unwrap_or_default(),
            last_window_change: format!("{:.2}", row.last_window_change),
            last_window_trend: row.last_window_trend,
            intraday_date: row.intraday_date,
        }
    }
}

fn run_summary(config: PipelineConfig, csv_path: Option<&Path>) -> Result<()> {
    let lookback_days = config.summary.lookback_days;
    let last_window = config.summary.last_window;
    let pipeline = build_pipeline(config)?;
    let series = pipeline.primary_series()?;
    let rows = pipeline.build_daily_summary(&series, lookback_days);

    println!(
        "{:<12} {:<10} {:>10} {:>10} {:>9} {:<6} {:>12} {:<6} {:<12}",
        "Date",
        "Day",
        "Open",
        "Close",
        "Change%",
        "Trend",
        format!("Last{last_window}Chg"),
        "Trend",
        "Intraday"
    );
    println!("{}", "-".repeat(98));
    for row in &rows {
        let record = SummaryRecord::from(row);
        println!(
            "{:<12} {:<10} {:>10} {:>10} {:>9} {:<6} {:>12} {:<6} {:<12}",
            record.date.to_string(),
            record.day,
            record.open,
            record.close,
            if record.change_pct.is_empty() { "-" } else { record.change_pct.as_str() },
            if record.trend.is_empty() { "-" } else { record.trend.as_str() },
            record.last_window_change,
            record.last_window_trend.to_string(),
            record
                .intraday_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }

    if let Some(path) = csv_path {
        write_summary_csv(path, &rows)?;
        println!();
        println!("Summary written to: {}", path.display());
    }
    Ok(())
}

fn write_summary_csv(path: &Path, rows: &[DailySummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(SummaryRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn run_metrics(config: PipelineConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let series = pipeline.primary_series()?;
    let Some(metrics) = pipeline.key_metrics(&series) else {
        bail!("no bars to compute metrics from");
    };
    let cfg = pipeline.config();

    println!();
    println!("=== {} ({}) ===", series.symbol, cfg.period.label());
    println!("Current Price:  ${:.2}", metrics.current_price);
    match metrics.change_pct {
        Some(c) => println!("Change:         {c:.2}%"),
        None => println!("Change:         -"),
    }
    println!("Period High:    ${:.2}", metrics.period_high);
    println!("Period Low:     ${:.2}", metrics.period_low);
    println!("Avg Volume:     {:.0}", metrics.avg_volume);

    let stats = pipeline.return_stats(&series);
    println!();
    println!(
        "--- {}-day rolling volatility (annualised) ---",
        cfg.analytics.volatility_window
    );
    match stats.rolling_volatility.iter().rev().find(|v| !v.is_nan()) {
        Some(vol) => println!("Latest:         {:.2}%", vol * 100.0),
        None => println!("Latest:         - (fewer than {} returns)", cfg.analytics.volatility_window),
    }

    println!();
    println!("--- Daily returns distribution ({} returns) ---", stats.returns.len());
    let peak = stats.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    for bin in &stats.histogram {
        let bar_len = if peak == 0 { 0 } else { bin.count * 40 / peak };
        println!(
            "{:>8.2}% .. {:>8.2}% {:>5} {}",
            bin.lower * 100.0,
            bin.upper * 100.0,
            bin.count,
            "#".repeat(bar_len)
        );
    }
    println!();
    Ok(())
}

fn run_intraday(config: PipelineConfig, date: Option<&str>, granularity: Granularity) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{s}', expected YYYY-MM-DD"))?,
        None => chrono::Utc::now().with_timezone(&pipeline.zone()).date_naive(),
    };
    let cfg = pipeline.config();

    let Some(dated) = pipeline.get_bars_for_date(&cfg.symbol, date, granularity) else {
        bail!(
            "no {granularity} bars for {} on {date} or the {} days before it",
            cfg.symbol,
            cfg.fallback.max_days_back
        );
    };

    if dated.substituted() {
        println!(
            "No data for {}, showing {} ({} day(s) earlier)",
            dated.requested,
            dated.actual,
            dated.steps()
        );
    }
    println!("{}: {} {} bars on {}", dated.series.symbol, dated.series.len(), granularity, dated.actual);
    print_bars(&dated.series);
    Ok(())
}
