//! Integration tests for the analytics pipeline
//!
//! These tests drive the full path from adjusted closes to matrices and
//! performance reports through `ReturnsAnalyzer`, and load the shipped
//! configuration file.

use ag_analytics::{
    create_return_matrix, AnalyticsConfig, AnalyticsError, AnnualReturnSeries, CachedPriceSource,
    DailyReturnSeries, DateRange, InMemoryPriceSource, MatrixSummary, PerformanceMetrics,
    PriceSeries, ReturnMetric, ReturnsAnalyzer,
};
use approx::assert_abs_diff_eq;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::time::Duration as StdDuration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Weekday closes over `[start, end]` with a deterministic daily pattern
fn generate_prices(start: NaiveDate, end: NaiveDate, drift: f64, amplitude: f64) -> PriceSeries {
    let mut points = Vec::new();
    let mut price = 50.0;
    let mut d = start;
    let mut i = 0.0_f64;
    while d <= end {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            price *= 1.0 + drift + amplitude * (i * 1.3).sin();
            points.push((d, price));
            i += 1.0;
        }
        d += Duration::days(1);
    }
    PriceSeries::new(points).unwrap()
}

fn market() -> InMemoryPriceSource {
    let (start, end) = (date(2014, 1, 2), date(2023, 12, 29));
    InMemoryPriceSource::new()
        .with_series("GROWTH", generate_prices(start, end, 0.0006, 0.012))
        .with_series("SPY", generate_prices(start, end, 0.0003, 0.008))
        .with_series("LATE", generate_prices(date(2021, 6, 1), end, 0.0002, 0.01))
}

#[test]
fn test_load_shipped_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/analytics.yaml");
    let config = AnalyticsConfig::from_yaml_file(path).expect("Failed to load analytics config");

    assert_eq!(config, AnalyticsConfig::default());
}

#[test]
fn test_full_pipeline_matrix() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let matrix = analyzer.return_matrix("growth", None).unwrap();

    assert_eq!(matrix.len(), 10);
    assert_eq!(matrix.years().first(), Some(&2014));
    assert_eq!(matrix.years().last(), Some(&2023));

    // Upper triangle undefined, lower triangle defined
    for &end in matrix.years() {
        for &start in matrix.years() {
            assert_eq!(matrix.get(end, start).is_some(), start <= end);
        }
    }

    let rows = matrix.to_percent_rows();
    assert_eq!(rows.first().map(|r| r.end_year), Some(2023));
    assert_eq!(rows.last().map(|r| r.end_year), Some(2014));
}

#[test]
fn test_matrix_summary_through_analyzer() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let summary = analyzer.summary("GROWTH", None).unwrap();

    let ten_year = summary.ten_year.unwrap();
    assert_eq!((ten_year.start_year, ten_year.end_year), (2014, 2023));
    assert_eq!(summary.full_period, Some(ten_year));

    let best = summary.best_single_year.unwrap();
    let worst = summary.worst_single_year.unwrap();
    assert!(best.value >= worst.value);
}

#[test]
fn test_comparison_against_late_listing_aligns_years() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let comparison = analyzer.comparison("GROWTH", "LATE", None).unwrap();

    assert_eq!(comparison.primary.years(), &[2021, 2022, 2023]);
    assert_eq!(comparison.benchmark.years(), comparison.primary.years());
    assert_eq!(comparison.difference.years(), comparison.primary.years());
}

#[test]
fn test_comparison_without_overlap() {
    let source = market().with_series(
        "OLD",
        generate_prices(date(2001, 1, 2), date(2005, 12, 30), 0.0002, 0.01),
    );
    let analyzer = ReturnsAnalyzer::with_defaults(source);
    let result = analyzer.comparison("GROWTH", "OLD", None);
    assert!(matches!(result, Err(AnalyticsError::NoOverlap(_))));
}

#[test]
fn test_performance_report_end_to_end() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let report = analyzer.performance("GROWTH", None, None).unwrap();

    assert_abs_diff_eq!(
        report.num_years,
        report.num_observations as f64 / 252.0,
        epsilon = 1e-12
    );
    assert!(report.risk.volatility > 0.0);
    assert!(report.risk.drawdown.max_drawdown <= 0.0);
    assert!(report.risk.conditional_var <= report.risk.value_at_risk);
    assert!(report.risk.ulcer_index >= report.risk.pain_index);
    assert!(report.relative.beta.unwrap() > 0.0);

    let r2 = report.relative.r_squared.unwrap();
    assert!((0.0..=1.0 + 1e-12).contains(&r2));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"sharpe_ratio\""));
}

#[test]
fn test_self_benchmark_identities() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let report = analyzer.performance("SPY", Some("spy"), None).unwrap();

    assert_abs_diff_eq!(report.relative.beta.unwrap(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.relative.alpha.unwrap(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(report.relative.r_squared.unwrap(), 1.0, epsilon = 1e-9);
    assert_eq!(report.relative.information_ratio, None);
}

#[test]
fn test_ranged_request() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let range = DateRange::from_years(2018, 2020).unwrap();

    let annual = analyzer.annual_returns("GROWTH", Some(range)).unwrap();
    assert_eq!(annual.years(), vec![2018, 2019, 2020]);

    let empty = DateRange::from_years(1990, 1991).unwrap();
    assert!(matches!(
        analyzer.annual_returns("GROWTH", Some(empty)),
        Err(AnalyticsError::NoData(_))
    ));
}

#[test]
fn test_cached_source_in_analyzer() {
    let cached = CachedPriceSource::new(market(), StdDuration::from_secs(60));
    let analyzer = ReturnsAnalyzer::with_defaults(cached);

    let first = analyzer.return_matrix("GROWTH", None).unwrap();
    let second = analyzer.return_matrix("growth", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(analyzer.source().len(), 1);
}

#[test]
fn test_compare_full_period() {
    let analyzer = ReturnsAnalyzer::with_defaults(market());
    let comparison = analyzer.compare_full_period(&["GROWTH", "SPY", "LATE", "UNKNOWN"], None);

    assert_eq!(comparison.results.len(), 3);
    assert_eq!(comparison.results["LATE"].start_year, 2021);
    assert_eq!(comparison.errors.len(), 1);
    assert!(comparison.errors.contains_key("UNKNOWN"));
}

#[test]
fn test_engines_from_raw_series() {
    // 2020: +10%, 2021: -5% as two daily steps each
    let daily = DailyReturnSeries::new(vec![
        (date(2020, 3, 2), 0.05),
        (date(2020, 9, 1), 1.10 / 1.05 - 1.0),
        (date(2021, 3, 1), -0.05),
    ])
    .unwrap();

    let annual = AnnualReturnSeries::from_daily(&daily).unwrap();
    assert_abs_diff_eq!(annual.get(2020).unwrap(), 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(annual.get(2021).unwrap(), -0.05, epsilon = 1e-12);

    let matrix = create_return_matrix(&annual, ReturnMetric::Cagr, None, None).unwrap();
    let summary = MatrixSummary::from_matrix(&matrix);
    assert_eq!(summary.best_single_year.map(|y| y.year), Some(2020));
    assert_eq!(summary.worst_single_year.map(|y| y.year), Some(2021));

    let metrics = PerformanceMetrics::new(daily, None, 0.02).unwrap();
    assert_abs_diff_eq!(metrics.total_return(), 1.10 * 0.95 - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(metrics.win_rate(), 0.5, epsilon = 1e-12);
}
