//! Performance metrics result record

use crate::performance::drawdown::DrawdownAnalysis;
use crate::series::YearValue;
use serde::{Deserialize, Serialize};

/// Every statistic computed from one daily return series
///
/// All figures are decimals. `None` marks a metric that is undefined for the
/// input (zero denominator, no benchmark, too few aligned observations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetricsResult {
    pub returns: ReturnMetrics,
    pub risk: RiskMetrics,
    pub risk_adjusted: RiskAdjustedMetrics,
    pub distribution: DistributionMetrics,
    pub periods: PeriodMetrics,
    pub relative: RelativeMetrics,

    /// Observations / 252
    pub num_years: f64,
    pub num_observations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub cagr: f64,
    pub total_return: f64,
    pub simple_annualized_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized standard deviation of daily returns
    pub volatility: f64,
    pub drawdown: DrawdownAnalysis,
    pub pain_index: f64,
    pub ulcer_index: f64,
    /// Tail probability used for VaR/CVaR (e.g. 0.05)
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_var: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjustedMetrics {
    pub sharpe_ratio: f64,
    /// `+inf` when no daily return falls below the daily risk-free rate
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionMetrics {
    pub skewness: Option<f64>,
    /// Excess kurtosis (normal = 0)
    pub kurtosis: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    /// Share of calendar years with a positive return
    pub win_rate: f64,
    pub best_year: Option<YearValue>,
    pub worst_year: Option<YearValue>,
    pub average_up_year: f64,
    pub average_down_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeMetrics {
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
    pub r_squared: Option<f64>,
    pub treynor_ratio: Option<f64>,
    pub information_ratio: Option<f64>,
    /// Annualized standard deviation of daily excess returns
    pub tracking_error: Option<f64>,
}
