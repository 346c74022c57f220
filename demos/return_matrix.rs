//! Return matrix example
//!
//! Builds CAGR matrices for a synthetic fund and its benchmark, prints them
//! as tables and reads off the headline figures.
//!
//! Run with: cargo run --example return_matrix

use ag_analytics::{
    init_tracing, AnalyticsConfig, AnalyticsError, InMemoryPriceSource, MatrixSummary,
    PriceSeries, ReturnMatrix, ReturnsAnalyzer,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn synthetic_prices(
    start: NaiveDate,
    end: NaiveDate,
    drift: f64,
    amplitude: f64,
) -> Result<PriceSeries, AnalyticsError> {
    let mut points = Vec::new();
    let mut price = 100.0;
    let mut date = start;
    let mut step = 0.0_f64;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            price *= 1.0 + drift + amplitude * (step * 0.9).sin() * (step * 0.013).cos();
            points.push((date, price));
            step += 1.0;
        }
        date += Duration::days(1);
    }
    PriceSeries::new(points)
}

fn print_matrix(title: &str, matrix: &ReturnMatrix) {
    println!("{} ({})", title, matrix.metric());
    print!("{:>6}", "end");
    for year in matrix.years() {
        print!("{:>8}", year);
    }
    println!();

    for row in matrix.to_percent_rows() {
        print!("{:>6}", row.end_year);
        for cell in &row.cells {
            match cell {
                Some(value) => print!("{:>8.2}", value),
                None => print!("{:>8}", ""),
            }
        }
        println!();
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("=== Return Matrix Example ===\n");

    let start = NaiveDate::from_ymd_opt(2012, 1, 3).ok_or("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2023, 12, 29).ok_or("invalid end date")?;

    let source = InMemoryPriceSource::new()
        .with_series("FUND", synthetic_prices(start, end, 0.0005, 0.015)?)
        .with_series("SPY", synthetic_prices(start, end, 0.0004, 0.01)?);

    let yaml = r#"
matrix:
  metric: "CAGR"
  start_year: 2014
"#;
    let config = AnalyticsConfig::from_yaml(yaml)?;
    let analyzer = ReturnsAnalyzer::new(config, source)?;

    // 1. Annual returns
    let annual = analyzer.annual_returns("fund", None)?;
    println!("Annual returns (%):");
    for (year, pct) in annual.to_percentages() {
        println!("  {}: {:>7.2}", year, pct);
    }
    println!();

    // 2. Matrices
    let comparison = analyzer.comparison("FUND", "SPY", None)?;
    print_matrix("FUND", &comparison.primary);
    print_matrix("SPY", &comparison.benchmark);
    print_matrix("FUND - SPY", &comparison.difference);

    // 3. Headline figures
    let summary = MatrixSummary::from_matrix(&comparison.primary);
    if let Some(best) = summary.best_single_year {
        println!("Best year:  {} ({:.2}%)", best.year, best.value * 100.0);
    }
    if let Some(worst) = summary.worst_single_year {
        println!("Worst year: {} ({:.2}%)", worst.year, worst.value * 100.0);
    }
    if let Some(ten) = summary.ten_year {
        println!(
            "10-year CAGR {}-{}: {:.2}%",
            ten.start_year,
            ten.end_year,
            ten.value * 100.0
        );
    }
    println!();

    // 4. Several tickers at once
    let full = analyzer.compare_full_period(&["FUND", "SPY", "QQQ"], None);
    println!("Full-period CAGR:");
    for (ticker, period) in &full.results {
        println!(
            "  {:<5} {}-{} ({} yrs): {:.2}%",
            ticker,
            period.start_year,
            period.end_year,
            period.years,
            period.value * 100.0
        );
    }
    for (ticker, error) in &full.errors {
        println!("  {:<5} failed: {}", ticker, error);
    }

    Ok(())
}
