//! Request-level facade over the analytics core
//!
//! `ReturnsAnalyzer` fetches prices through a [`PriceSource`] and runs them
//! through the series, matrix and performance engines using the settings in
//! an [`AnalyticsConfig`].

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::matrix::{
    create_comparison, create_return_matrix, ComparisonMatrices, MatrixSummary, PeriodValue,
    ReturnMatrix,
};
use crate::performance::{PerformanceMetrics, PerformanceMetricsResult};
use crate::provider::{normalize_ticker, PriceSource};
use crate::series::{AnnualReturnSeries, DailyReturnSeries, DateRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full-period values for several tickers
///
/// A ticker that fails lands in `errors` and never aborts the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullPeriodComparison {
    pub results: BTreeMap<String, PeriodValue>,
    pub errors: BTreeMap<String, String>,
}

/// Analytics entry point for ticker-level requests
pub struct ReturnsAnalyzer<S> {
    config: AnalyticsConfig,
    source: S,
}

impl<S: PriceSource> ReturnsAnalyzer<S> {
    /// Create an analyzer after validating `config`
    pub fn new(config: AnalyticsConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Analyzer with [`AnalyticsConfig::default`]
    pub fn with_defaults(source: S) -> Self {
        Self {
            config: AnalyticsConfig::default(),
            source,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The trailing `history_years` window ending at `today`
    ///
    /// Request methods take `range: Option<DateRange>`; `None` means the
    /// source's full history. Pass `Some(analyzer.default_range(today)?)` to
    /// apply the configured window.
    pub fn default_range(&self, today: NaiveDate) -> Result<DateRange> {
        DateRange::trailing_years(today, self.config.history_years)
    }

    pub fn daily_returns(&self, ticker: &str, range: Option<DateRange>) -> Result<DailyReturnSeries> {
        let prices = self.source.fetch_prices(ticker, range)?;
        prices.daily_returns()
    }

    pub fn annual_returns(
        &self,
        ticker: &str,
        range: Option<DateRange>,
    ) -> Result<AnnualReturnSeries> {
        let daily = self.daily_returns(ticker, range)?;
        AnnualReturnSeries::from_daily(&daily)
    }

    /// Return matrix for `ticker` with the configured metric and year bounds
    pub fn return_matrix(&self, ticker: &str, range: Option<DateRange>) -> Result<ReturnMatrix> {
        tracing::info!(
            ticker = %normalize_ticker(ticker),
            metric = %self.config.matrix.metric,
            "return matrix requested"
        );
        let annual = self.annual_returns(ticker, range)?;
        create_return_matrix(
            &annual,
            self.config.matrix.metric,
            self.config.matrix.start_year,
            self.config.matrix.end_year,
        )
    }

    /// Headline figures of the configured return matrix
    pub fn summary(&self, ticker: &str, range: Option<DateRange>) -> Result<MatrixSummary> {
        let matrix = self.return_matrix(ticker, range)?;
        Ok(MatrixSummary::from_matrix(&matrix))
    }

    /// Primary, benchmark, difference and ratio matrices over common years
    pub fn comparison(
        &self,
        primary: &str,
        benchmark: &str,
        range: Option<DateRange>,
    ) -> Result<ComparisonMatrices> {
        tracing::info!(
            primary = %normalize_ticker(primary),
            benchmark = %normalize_ticker(benchmark),
            "comparison requested"
        );
        let primary_annual = self.annual_returns(primary, range)?;
        let benchmark_annual = self.annual_returns(benchmark, range)?;
        create_comparison(
            &primary_annual,
            &benchmark_annual,
            self.config.matrix.metric,
            self.config.matrix.start_year,
            self.config.matrix.end_year,
        )
    }

    /// Full performance report for `ticker`
    ///
    /// `benchmark` falls back to the configured benchmark. If the benchmark
    /// cannot be fetched the report is still produced, with the relative
    /// metrics left undefined.
    pub fn performance(
        &self,
        ticker: &str,
        benchmark: Option<&str>,
        range: Option<DateRange>,
    ) -> Result<PerformanceMetricsResult> {
        let daily = self.daily_returns(ticker, range)?;

        let benchmark_ticker = benchmark
            .map(str::to_string)
            .or_else(|| self.config.benchmark.clone());
        let benchmark_returns = match benchmark_ticker {
            Some(symbol) => match self.daily_returns(&symbol, range) {
                Ok(returns) => Some(returns),
                Err(e) => {
                    tracing::warn!(
                        benchmark = %normalize_ticker(&symbol),
                        error = %e,
                        "benchmark unavailable, relative metrics skipped"
                    );
                    None
                }
            },
            None => None,
        };

        tracing::info!(
            ticker = %normalize_ticker(ticker),
            observations = daily.len(),
            with_benchmark = benchmark_returns.is_some(),
            "performance requested"
        );

        let metrics = PerformanceMetrics::new(daily, benchmark_returns, self.config.risk_free_rate)?;
        metrics.compute(self.config.confidence)
    }

    /// Full-period matrix value for each ticker
    pub fn compare_full_period(
        &self,
        tickers: &[&str],
        range: Option<DateRange>,
    ) -> FullPeriodComparison {
        let mut comparison = FullPeriodComparison::default();

        for ticker in tickers {
            let key = normalize_ticker(ticker);
            let outcome = self
                .summary(ticker, range)
                .map(|summary| summary.full_period);

            match outcome {
                Ok(Some(period)) => {
                    comparison.results.insert(key, period);
                }
                Ok(None) => {
                    comparison
                        .errors
                        .insert(key, "no full-period value".to_string());
                }
                Err(e) => {
                    tracing::warn!(ticker = %key, error = %e, "full-period comparison failed");
                    comparison.errors.insert(key, e.to_string());
                }
            }
        }

        comparison
    }
}
