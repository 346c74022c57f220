//! # ag-analytics: Return Matrices and Performance Analytics
//!
//! This library turns adjusted daily closes for a single instrument into
//! year-by-year return matrices and a full set of performance, risk and
//! benchmark-relative metrics.
//!
//! ## Core Components
//!
//! - **Series**: `PriceSeries` -> `DailyReturnSeries` -> `AnnualReturnSeries`
//! - **Return Matrix**: CAGR / total / simple annualized return for every
//!   `[start, end]` year pair, plus difference and ratio matrices against a
//!   benchmark
//! - **PerformanceMetrics**: CAGR, volatility, Sharpe, Sortino, Calmar,
//!   drawdown, VaR/CVaR, beta, alpha, information ratio and more
//! - **ReturnsAnalyzer**: ticker-level requests over a pluggable `PriceSource`
//!
//! All values are decimals (0.05 = 5%). Percentages only appear in the
//! presentation helpers.
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_analytics::{create_return_matrix, AnnualReturnSeries, ReturnMetric};
//!
//! let annual = AnnualReturnSeries::from_percentages(vec![
//!     (2020, 10.0),
//!     (2021, -5.0),
//!     (2022, 20.0),
//! ])
//! .unwrap();
//!
//! let matrix = create_return_matrix(&annual, ReturnMetric::TotalReturn, None, None).unwrap();
//!
//! // 1.10 * 0.95 * 1.20 - 1
//! let total = matrix.get(2022, 2020).unwrap();
//! assert!((total - 0.254).abs() < 1e-9);
//!
//! // Cells where the end year precedes the start year are undefined
//! assert_eq!(matrix.get(2020, 2022), None);
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod matrix;
pub mod performance;
pub mod provider;
pub mod series;

// Re-export main types
pub use analyzer::{FullPeriodComparison, ReturnsAnalyzer};
pub use config::{AnalyticsConfig, CacheConfig, MatrixConfig};
pub use error::{AnalyticsError, Result};
pub use matrix::{
    align_series, create_comparison, create_difference_matrix, create_ratio_matrix,
    create_return_matrix, ComparisonMatrices, MatrixKind, MatrixRow, MatrixSummary, PeriodValue,
    ReturnMatrix, ReturnMetric,
};
pub use performance::{
    DrawdownAnalysis, PerformanceMetrics, PerformanceMetricsResult, DEFAULT_CONFIDENCE,
    DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR,
};
pub use provider::{normalize_ticker, CachedPriceSource, InMemoryPriceSource, PriceSource};
pub use series::{
    AlignedReturns, AnnualReturnSeries, DailyReturn, DailyReturnSeries, DateRange, PricePoint,
    PriceSeries, YearValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing subscriber (for demos and tests)
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ag_analytics=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
