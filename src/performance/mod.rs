//! # Performance Metrics
//!
//! Return, risk and benchmark-relative statistics over a daily return series.
//!
//! ## Modules
//!
//! - `engine`: `PerformanceMetrics` calculator (CAGR, Sharpe, Sortino, Calmar, VaR, beta, ...)
//! - `drawdown`: Wealth curve drawdown, peak/trough/recovery dates
//! - `report`: Serializable metrics record
//! - `stats`: Sample statistics helpers

mod drawdown;
mod engine;
mod report;
mod stats;

pub use drawdown::DrawdownAnalysis;
pub use engine::{
    PerformanceMetrics, DEFAULT_CONFIDENCE, DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR,
};
pub use report::{
    DistributionMetrics, PerformanceMetricsResult, PeriodMetrics, RelativeMetrics,
    ReturnMetrics, RiskAdjustedMetrics, RiskMetrics,
};
