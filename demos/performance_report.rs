//! Performance report example
//!
//! Computes the full metrics record for a synthetic fund against a
//! benchmark and prints it grouped by category, then as JSON.
//!
//! Run with: cargo run --example performance_report

use ag_analytics::{
    init_tracing, AnalyticsConfig, AnalyticsError, CachedPriceSource, InMemoryPriceSource,
    PriceSeries, ReturnsAnalyzer,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn synthetic_prices(
    start: NaiveDate,
    end: NaiveDate,
    drift: f64,
    amplitude: f64,
    phase: f64,
) -> Result<PriceSeries, AnalyticsError> {
    let mut points = Vec::new();
    let mut price = 100.0;
    let mut date = start;
    let mut step = 0.0_f64;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let shock = (step * 0.61 + phase).sin() + 0.5 * (step * 0.007).sin();
            price *= 1.0 + drift + amplitude * shock;
            points.push((date, price));
            step += 1.0;
        }
        date += Duration::days(1);
    }
    PriceSeries::new(points)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("=== Performance Report Example ===\n");

    let start = NaiveDate::from_ymd_opt(2015, 1, 2).ok_or("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2023, 12, 29).ok_or("invalid end date")?;

    let source = InMemoryPriceSource::new()
        .with_series("FUND", synthetic_prices(start, end, 0.0005, 0.012, 0.0)?)
        .with_series("SPY", synthetic_prices(start, end, 0.0004, 0.009, 0.3)?);

    let config = AnalyticsConfig::default();
    let cached = CachedPriceSource::from_config(source, &config.cache);
    let analyzer = ReturnsAnalyzer::new(config, cached)?;

    let report = analyzer.performance("FUND", None, None)?;

    println!(
        "Observations: {} ({:.2} years)\n",
        report.num_observations, report.num_years
    );

    println!("--- Returns ---");
    println!("CAGR:                     {:.2}%", report.returns.cagr * 100.0);
    println!("Total Return:             {:.2}%", report.returns.total_return * 100.0);
    println!(
        "Simple Annualized Return: {:.2}%",
        report.returns.simple_annualized_return * 100.0
    );
    println!();

    println!("--- Risk ---");
    println!("Volatility:     {:.2}%", report.risk.volatility * 100.0);
    let drawdown = &report.risk.drawdown;
    println!("Max Drawdown:   {:.2}%", drawdown.max_drawdown * 100.0);
    if let (Some(peak), Some(trough)) = (drawdown.peak_date, drawdown.trough_date) {
        println!("  Peak {} -> trough {}", peak, trough);
    }
    match drawdown.recovery_days {
        Some(days) => println!("  Recovered in {} days", days),
        None => println!("  Not yet recovered"),
    }
    println!("Pain Index:     {:.4}", report.risk.pain_index);
    println!("Ulcer Index:    {:.4}", report.risk.ulcer_index);
    println!(
        "VaR ({:.0}%):      {:.2}%",
        report.risk.confidence * 100.0,
        report.risk.value_at_risk * 100.0
    );
    println!("CVaR:           {:.2}%", report.risk.conditional_var * 100.0);
    println!();

    println!("--- Risk-Adjusted ---");
    println!("Sharpe:  {:.3}", report.risk_adjusted.sharpe_ratio);
    println!("Sortino: {:.3}", report.risk_adjusted.sortino_ratio);
    println!("Calmar:  {:.3}", report.risk_adjusted.calmar_ratio);
    println!();

    println!("--- Distribution ---");
    println!("Skewness: {}", fmt_opt(report.distribution.skewness));
    println!("Kurtosis: {}", fmt_opt(report.distribution.kurtosis));
    println!();

    println!("--- Calendar Years ---");
    println!("Win Rate:      {:.1}%", report.periods.win_rate * 100.0);
    if let Some(best) = report.periods.best_year {
        println!("Best Year:     {} ({:.2}%)", best.year, best.value * 100.0);
    }
    if let Some(worst) = report.periods.worst_year {
        println!("Worst Year:    {} ({:.2}%)", worst.year, worst.value * 100.0);
    }
    println!("Avg Up Year:   {:.2}%", report.periods.average_up_year * 100.0);
    println!("Avg Down Year: {:.2}%", report.periods.average_down_year * 100.0);
    println!();

    println!("--- vs {} ---", analyzer.config().benchmark.as_deref().unwrap_or("n/a"));
    println!("Beta:              {}", fmt_opt(report.relative.beta));
    println!("Alpha:             {}", fmt_opt(report.relative.alpha));
    println!("R-squared:         {}", fmt_opt(report.relative.r_squared));
    println!("Treynor:           {}", fmt_opt(report.relative.treynor_ratio));
    println!("Information Ratio: {}", fmt_opt(report.relative.information_ratio));
    println!("Tracking Error:    {}", fmt_opt(report.relative.tracking_error));
    println!();

    // Second request is served from the price cache when caching is enabled
    let _ = analyzer.performance("fund", None, None)?;
    println!(
        "Cache enabled: {}, cached price series: {}",
        analyzer.source().is_enabled(),
        analyzer.source().len()
    );
    println!();

    println!("--- JSON ---");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
