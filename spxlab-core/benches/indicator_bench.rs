//! Criterion benchmarks for SPX Lab hot paths.
//!
//! Benchmarks:
//! 1. Individual indicator columns (SMA, EMA, RSI, Bollinger, MACD)
//! 2. Full dashboard indicator set over a series
//! 3. Daily resampling of minute bars

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spxlab_core::domain::{Bar, BarSeries, Granularity, Timestamp};
use spxlab_core::indicators::{
    bollinger_of_series, compute_indicators, ema_of_series, macd_of_series, rsi_of_series,
    sma_of_series, IndicatorSpec, MacdParams,
};
use spxlab_core::summary::resample_daily;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 4500.0 + (i as f64 * 0.1).sin() * 50.0 + i as f64 * 0.05)
        .collect()
}

fn make_bars(n: usize, step: chrono::Duration) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    make_closes(n)
        .into_iter()
        .enumerate()
        .map(|(i, close)| Bar {
            timestamp: Timestamp::Naive(base + step * i as i32),
            open: close - 0.3,
            high: close + 1.5,
            low: close - 1.5,
            close,
            volume: 1_000_000 + (i as u64 % 500_000),
        })
        .collect()
}

// ── 1. Indicator columns ─────────────────────────────────────────────

fn bench_indicator_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_columns");
    for &n in &[252usize, 1260, 5040] {
        let closes = make_closes(n);
        group.bench_with_input(BenchmarkId::new("sma_200", n), &closes, |b, v| {
            b.iter(|| sma_of_series(black_box(v), 200))
        });
        group.bench_with_input(BenchmarkId::new("ema_20", n), &closes, |b, v| {
            b.iter(|| ema_of_series(black_box(v), 20))
        });
        group.bench_with_input(BenchmarkId::new("rsi_14", n), &closes, |b, v| {
            b.iter(|| rsi_of_series(black_box(v), 14))
        });
        group.bench_with_input(BenchmarkId::new("bollinger_20_2", n), &closes, |b, v| {
            b.iter(|| bollinger_of_series(black_box(v), 20, 2.0))
        });
        group.bench_with_input(BenchmarkId::new("macd_12_26_9", n), &closes, |b, v| {
            b.iter(|| macd_of_series(black_box(v), MacdParams::default()))
        });
    }
    group.finish();
}

// ── 2. Dashboard set ─────────────────────────────────────────────────

fn bench_dashboard_set(c: &mut Criterion) {
    let series = BarSeries::new(
        "^GSPC",
        Granularity::OneDay,
        make_bars(1260, chrono::Duration::days(1)),
    );
    let specs = IndicatorSpec::dashboard_defaults();
    c.bench_function("dashboard_indicators_5y", |b| {
        b.iter(|| compute_indicators(black_box(&series), black_box(&specs)))
    });
}

// ── 3. Resampling ────────────────────────────────────────────────────

fn bench_resample(c: &mut Criterion) {
    // ~30 sessions of minute bars
    let series = BarSeries::new(
        "^GSPC",
        Granularity::OneMinute,
        make_bars(390 * 30, chrono::Duration::minutes(1)),
    );
    c.bench_function("resample_minutes_to_daily", |b| {
        b.iter(|| resample_daily(black_box(&series)))
    });
}

criterion_group!(
    benches,
    bench_indicator_columns,
    bench_dashboard_set,
    bench_resample
);
criterion_main!(benches);
