//! Performance metrics calculation
//!
//! Implements return, risk, risk-adjusted, distribution and
//! benchmark-relative metrics from daily returns:
//! - CAGR: (1 + Total Return)^(1 / Years) - 1, Years = observations / 252
//! - Sharpe Ratio: (CAGR - Risk-Free Rate) / Annualized Volatility
//! - Sortino Ratio: uses downside deviation below the daily risk-free rate
//! - Maximum Drawdown: largest peak-to-trough decline, with recovery
//! - Beta / Alpha / R²: regression against a date-aligned benchmark

use crate::error::{AnalyticsError, Result};
use crate::performance::drawdown::{DrawdownAnalysis, DrawdownPath};
use crate::performance::report::{
    DistributionMetrics, PerformanceMetricsResult, PeriodMetrics, RelativeMetrics,
    ReturnMetrics, RiskAdjustedMetrics, RiskMetrics,
};
use crate::performance::stats;
use crate::series::{AlignedReturns, DailyReturnSeries, YearValue};
use std::collections::BTreeMap;

/// Trading days per year used for every annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default annual risk-free rate
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Default VaR/CVaR tail probability
pub const DEFAULT_CONFIDENCE: f64 = 0.05;

/// Performance metrics calculator
///
/// Immutable once built: base quantities (total return, years, annual
/// returns, drawdown path, benchmark alignment) are derived in [`new`] and
/// every metric is a pure function of them.
///
/// [`new`]: PerformanceMetrics::new
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    returns: DailyReturnSeries,
    values: Vec<f64>,
    benchmark: Option<DailyReturnSeries>,
    aligned: Option<AlignedReturns>,

    /// Risk-free rate (annualized)
    risk_free_rate: f64,
    daily_risk_free_rate: f64,

    total_return: f64,
    num_years: f64,
    annual_returns: BTreeMap<i32, f64>,
    drawdown: DrawdownPath,
}

impl PerformanceMetrics {
    /// Create a new performance metrics calculator
    ///
    /// Missing (non-finite) observations have already been dropped by
    /// [`DailyReturnSeries::new`]. An empty or disjoint benchmark leaves the
    /// benchmark-relative metrics undefined.
    ///
    /// # Errors
    ///
    /// `NoData` if `returns` is empty, `InvalidParameter` if the risk-free
    /// rate is not a finite number above -100%.
    pub fn new(
        returns: DailyReturnSeries,
        benchmark: Option<DailyReturnSeries>,
        risk_free_rate: f64,
    ) -> Result<Self> {
        if returns.is_empty() {
            return Err(AnalyticsError::NoData(
                "daily return series is empty".to_string(),
            ));
        }
        if !risk_free_rate.is_finite() || risk_free_rate <= -1.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "risk-free rate must be finite and above -1, got {}",
                risk_free_rate
            )));
        }

        let benchmark = benchmark.filter(|b| !b.is_empty());
        let aligned = benchmark.as_ref().and_then(|b| match returns.align(b) {
            Ok(aligned) => Some(aligned),
            Err(e) => {
                tracing::debug!(error = %e, "benchmark not aligned");
                None
            }
        });

        let values = returns.values();
        let total_return = returns.total_return();
        let num_years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annual_returns = returns.compound_by_year();
        let drawdown = DrawdownPath::from_returns(&values);

        tracing::debug!(
            observations = values.len(),
            years = annual_returns.len(),
            aligned = aligned.as_ref().map_or(0, |a| a.len()),
            "performance metrics initialized"
        );

        Ok(Self {
            returns,
            values,
            benchmark,
            aligned,
            risk_free_rate,
            daily_risk_free_rate: (1.0 + risk_free_rate).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0,
            total_return,
            num_years,
            annual_returns,
            drawdown,
        })
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// `(1 + rf)^(1/252) - 1`
    pub fn daily_risk_free_rate(&self) -> f64 {
        self.daily_risk_free_rate
    }

    pub fn num_observations(&self) -> usize {
        self.values.len()
    }

    pub fn num_years(&self) -> f64 {
        self.num_years
    }

    /// Unrounded compounded return per calendar year
    pub fn annual_returns(&self) -> &BTreeMap<i32, f64> {
        &self.annual_returns
    }

    /// `∏(1 + r) - 1` over the whole series
    pub fn total_return(&self) -> f64 {
        self.total_return
    }

    /// Compound Annual Growth Rate
    pub fn cagr(&self) -> f64 {
        annualize(self.total_return, self.num_years)
    }

    /// Total return divided by the number of years
    pub fn simple_annualized_return(&self) -> f64 {
        if self.num_years <= 0.0 {
            return 0.0;
        }
        self.total_return / self.num_years
    }

    /// Standard deviation of daily returns, optionally annualized by √252
    ///
    /// 0 with fewer than two observations.
    pub fn volatility(&self, annualized: bool) -> f64 {
        let daily = stats::sample_std(&self.values).unwrap_or(0.0);
        if annualized {
            daily * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            daily
        }
    }

    /// Calculate Sharpe Ratio
    ///
    /// Sharpe = (CAGR - Risk-Free Rate) / Annualized Volatility
    pub fn sharpe_ratio(&self) -> f64 {
        let volatility = self.volatility(true);
        if volatility <= 0.0 {
            return 0.0;
        }
        (self.cagr() - self.risk_free_rate) / volatility
    }

    /// Calculate Sortino Ratio
    ///
    /// Sortino = (CAGR - Risk-Free Rate) / (Downside Deviation × √252)
    ///
    /// Downside observations are the daily returns below the *daily*
    /// risk-free rate while the numerator uses the annual rate.
    pub fn sortino_ratio(&self) -> f64 {
        let downside: Vec<f64> = self
            .values
            .iter()
            .copied()
            .filter(|r| *r < self.daily_risk_free_rate)
            .collect();

        if downside.is_empty() {
            return f64::INFINITY;
        }

        let downside_deviation =
            stats::sample_std(&downside).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR.sqrt();
        if downside_deviation <= 0.0 {
            return 0.0;
        }

        (self.cagr() - self.risk_free_rate) / downside_deviation
    }

    /// Maximum drawdown with peak, trough and recovery dates
    pub fn maximum_drawdown(&self) -> DrawdownAnalysis {
        self.drawdown.analyze(&self.returns.dates())
    }

    /// Calculate Calmar Ratio
    ///
    /// Calmar = CAGR / |Maximum Drawdown|
    pub fn calmar_ratio(&self) -> f64 {
        let max_dd = self.maximum_drawdown().max_drawdown.abs();
        if max_dd <= 0.0 {
            return 0.0;
        }
        self.cagr() / max_dd
    }

    /// Historical VaR: the `confidence` percentile of daily returns
    ///
    /// Not annualized. `confidence` is the tail probability, e.g. 0.05.
    pub fn value_at_risk(&self, confidence: f64) -> Result<f64> {
        validate_confidence(confidence)?;
        stats::percentile(&self.values, confidence)
            .ok_or_else(|| AnalyticsError::NoData("no returns for VaR".to_string()))
    }

    /// Conditional VaR (expected shortfall): mean of returns at or below VaR
    pub fn conditional_var(&self, confidence: f64) -> Result<f64> {
        let var = self.value_at_risk(confidence)?;
        let tail: Vec<f64> = self.values.iter().copied().filter(|r| *r <= var).collect();
        stats::mean(&tail)
            .ok_or_else(|| AnalyticsError::NoData("no returns in VaR tail".to_string()))
    }

    pub fn skewness(&self) -> Option<f64> {
        stats::skewness(&self.values)
    }

    /// Excess kurtosis
    pub fn kurtosis(&self) -> Option<f64> {
        stats::excess_kurtosis(&self.values)
    }

    /// Share of calendar years with a positive compounded return
    pub fn win_rate(&self) -> f64 {
        if self.annual_returns.is_empty() {
            return 0.0;
        }
        let wins = self.annual_returns.values().filter(|r| **r > 0.0).count();
        wins as f64 / self.annual_returns.len() as f64
    }

    /// Best calendar year (earliest on ties)
    pub fn best_year(&self) -> Option<YearValue> {
        self.annual_returns.iter().fold(None, |best, (year, r)| match best {
            Some(YearValue { value, .. }) if value >= *r => best,
            _ => Some(YearValue { year: *year, value: *r }),
        })
    }

    /// Worst calendar year (earliest on ties)
    pub fn worst_year(&self) -> Option<YearValue> {
        self.annual_returns.iter().fold(None, |worst, (year, r)| match worst {
            Some(YearValue { value, .. }) if value <= *r => worst,
            _ => Some(YearValue { year: *year, value: *r }),
        })
    }

    /// Mean of the strictly positive annual returns
    pub fn average_up_year(&self) -> f64 {
        let ups: Vec<f64> = self.annual_returns.values().copied().filter(|r| *r > 0.0).collect();
        stats::mean(&ups).unwrap_or(0.0)
    }

    /// Mean of the strictly negative annual returns
    pub fn average_down_year(&self) -> f64 {
        let downs: Vec<f64> = self.annual_returns.values().copied().filter(|r| *r < 0.0).collect();
        stats::mean(&downs).unwrap_or(0.0)
    }

    /// Mean absolute drawdown over the whole series
    pub fn pain_index(&self) -> f64 {
        stats::mean(&self.drawdown.drawdowns).map_or(0.0, f64::abs)
    }

    /// Root mean square of the drawdown series
    pub fn ulcer_index(&self) -> f64 {
        stats::root_mean_square(&self.drawdown.drawdowns).unwrap_or(0.0)
    }

    /// Aligned observations, when at least two dates are shared
    fn aligned_pairs(&self) -> Option<&AlignedReturns> {
        self.aligned.as_ref().filter(|a| a.len() >= 2)
    }

    /// CAGR of the full benchmark series
    fn benchmark_cagr(&self) -> Option<f64> {
        let benchmark = self.benchmark.as_ref()?;
        let years = benchmark.len() as f64 / TRADING_DAYS_PER_YEAR;
        Some(annualize(benchmark.total_return(), years))
    }

    /// Calculate Beta relative to benchmark
    ///
    /// Beta = Covariance(Asset, Benchmark) / Variance(Benchmark), over
    /// date-aligned observations.
    pub fn beta(&self) -> Option<f64> {
        let aligned = self.aligned_pairs()?;
        let covariance = stats::sample_covariance(&aligned.asset, &aligned.benchmark)?;
        let variance = stats::sample_std(&aligned.benchmark)?.powi(2);
        if variance <= 0.0 {
            return None;
        }
        Some(covariance / variance)
    }

    /// Jensen's Alpha
    ///
    /// Alpha = CAGR - (Risk-Free Rate + Beta × (Benchmark CAGR - Risk-Free Rate))
    pub fn alpha(&self) -> Option<f64> {
        let beta = self.beta()?;
        let benchmark_cagr = self.benchmark_cagr()?;
        let expected = self.risk_free_rate + beta * (benchmark_cagr - self.risk_free_rate);
        Some(self.cagr() - expected)
    }

    /// Squared Pearson correlation with the benchmark
    pub fn r_squared(&self) -> Option<f64> {
        let aligned = self.aligned_pairs()?;
        stats::correlation(&aligned.asset, &aligned.benchmark).map(|c| c * c)
    }

    /// Excess return per unit of beta
    pub fn treynor_ratio(&self) -> Option<f64> {
        let beta = self.beta()?;
        if beta == 0.0 {
            return None;
        }
        Some((self.cagr() - self.risk_free_rate) / beta)
    }

    /// Annualized standard deviation of daily asset-minus-benchmark returns
    pub fn tracking_error(&self) -> Option<f64> {
        let aligned = self.aligned_pairs()?;
        let excess: Vec<f64> = aligned
            .asset
            .iter()
            .zip(&aligned.benchmark)
            .map(|(a, b)| a - b)
            .collect();
        stats::sample_std(&excess).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt())
    }

    /// Information Ratio
    ///
    /// IR = (CAGR - Benchmark CAGR) / Tracking Error
    pub fn information_ratio(&self) -> Option<f64> {
        let tracking_error = self.tracking_error()?;
        if tracking_error == 0.0 {
            return None;
        }
        let benchmark_cagr = self.benchmark_cagr()?;
        Some((self.cagr() - benchmark_cagr) / tracking_error)
    }

    /// Compute the full metrics record
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `confidence` is not strictly between 0 and 1.
    pub fn compute(&self, confidence: f64) -> Result<PerformanceMetricsResult> {
        let value_at_risk = self.value_at_risk(confidence)?;
        let conditional_var = self.conditional_var(confidence)?;

        Ok(PerformanceMetricsResult {
            returns: ReturnMetrics {
                cagr: self.cagr(),
                total_return: self.total_return,
                simple_annualized_return: self.simple_annualized_return(),
            },
            risk: RiskMetrics {
                volatility: self.volatility(true),
                drawdown: self.maximum_drawdown(),
                pain_index: self.pain_index(),
                ulcer_index: self.ulcer_index(),
                confidence,
                value_at_risk,
                conditional_var,
            },
            risk_adjusted: RiskAdjustedMetrics {
                sharpe_ratio: self.sharpe_ratio(),
                sortino_ratio: self.sortino_ratio(),
                calmar_ratio: self.calmar_ratio(),
            },
            distribution: DistributionMetrics {
                skewness: self.skewness(),
                kurtosis: self.kurtosis(),
            },
            periods: PeriodMetrics {
                win_rate: self.win_rate(),
                best_year: self.best_year(),
                worst_year: self.worst_year(),
                average_up_year: self.average_up_year(),
                average_down_year: self.average_down_year(),
            },
            relative: RelativeMetrics {
                beta: self.beta(),
                alpha: self.alpha(),
                r_squared: self.r_squared(),
                treynor_ratio: self.treynor_ratio(),
                information_ratio: self.information_ratio(),
                tracking_error: self.tracking_error(),
            },
            num_years: self.num_years,
            num_observations: self.values.len(),
        })
    }
}

/// `(1 + total)^(1 / years) - 1`, 0 for a non-positive span
fn annualize(total_return: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(1.0 / years) - 1.0
}

fn validate_confidence(confidence: f64) -> Result<()> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "confidence must be between 0 and 1, got {}",
            confidence
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Datelike, Duration, NaiveDate, Weekday};

    /// Consecutive weekdays starting at `start`
    fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        let mut out = Vec::with_capacity(n);
        let mut d = start;
        while out.len() < n {
            if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
                out.push(d);
            }
            d += Duration::days(1);
        }
        out
    }

    fn series_from(start: NaiveDate, values: &[f64]) -> DailyReturnSeries {
        let dates = business_days(start, values.len());
        DailyReturnSeries::new(dates.into_iter().zip(values.iter().copied()).collect()).unwrap()
    }

    fn create_test_returns() -> Vec<f64> {
        vec![
            0.01, 0.02, -0.01, 0.015, -0.005,
            0.03, -0.02, 0.01, 0.005, -0.01,
            0.02, 0.01, -0.015, 0.025, 0.01,
            -0.005, 0.015, 0.02, -0.01, 0.005,
        ]
    }

    fn create_market_returns() -> Vec<f64> {
        vec![
            0.008, 0.015, -0.012, 0.01, -0.008,
            0.025, -0.018, 0.012, 0.003, -0.015,
            0.018, 0.009, -0.02, 0.022, 0.012,
            -0.007, 0.013, 0.017, -0.012, 0.004,
        ]
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
    }

    fn metrics_with_market() -> PerformanceMetrics {
        PerformanceMetrics::new(
            series_from(start(), &create_test_returns()),
            Some(series_from(start(), &create_market_returns())),
            0.02,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let result = PerformanceMetrics::new(DailyReturnSeries::default(), None, 0.02);
        assert!(matches!(result, Err(AnalyticsError::NoData(_))));
    }

    #[test]
    fn test_invalid_risk_free_rate() {
        let returns = series_from(start(), &[0.01, 0.02]);
        assert!(PerformanceMetrics::new(returns.clone(), None, f64::NAN).is_err());
        assert!(PerformanceMetrics::new(returns, None, -1.0).is_err());
    }

    #[test]
    fn test_daily_risk_free_rate() {
        let metrics = PerformanceMetrics::new(series_from(start(), &[0.01]), None, 0.02).unwrap();
        let compounded = (1.0 + metrics.daily_risk_free_rate()).powf(252.0);
        assert_abs_diff_eq!(compounded, 1.02, epsilon = 1e-12);
    }

    #[test]
    fn test_cagr_over_one_trading_year() {
        // 252 identical daily returns compound to exactly one year.
        let daily = 1.10_f64.powf(1.0 / 252.0) - 1.0;
        let metrics =
            PerformanceMetrics::new(series_from(start(), &vec![daily; 252]), None, 0.02).unwrap();

        assert_abs_diff_eq!(metrics.num_years(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.total_return(), 0.10, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.cagr(), 0.10, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.simple_annualized_return(), 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_sharpe_ratio() {
        let metrics = metrics_with_market();
        let expected = (metrics.cagr() - 0.02) / metrics.volatility(true);
        assert_abs_diff_eq!(metrics.sharpe_ratio(), expected, epsilon = 1e-12);
        assert!(metrics.sharpe_ratio() > 0.0);
    }

    #[test]
    fn test_zero_volatility() {
        let metrics =
            PerformanceMetrics::new(series_from(start(), &[0.01; 20]), None, 0.02).unwrap();
        assert_eq!(metrics.volatility(true), 0.0);
        assert_eq!(metrics.sharpe_ratio(), 0.0);
    }

    #[test]
    fn test_volatility_annualization() {
        let metrics = metrics_with_market();
        assert_abs_diff_eq!(
            metrics.volatility(true),
            metrics.volatility(false) * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sortino_without_downside_is_infinite() {
        let metrics =
            PerformanceMetrics::new(series_from(start(), &[0.01, 0.02, 0.03]), None, 0.02)
                .unwrap();
        assert_eq!(metrics.sortino_ratio(), f64::INFINITY);
    }

    #[test]
    fn test_sortino_single_downside_observation_is_zero() {
        let metrics =
            PerformanceMetrics::new(series_from(start(), &[0.01, -0.02, 0.03]), None, 0.02)
                .unwrap();
        assert_eq!(metrics.sortino_ratio(), 0.0);
    }

    #[test]
    fn test_sortino_flat_downside_is_zero() {
        let values = [0.01, -0.02, 0.03, -0.02, 0.02, -0.02];
        let metrics = PerformanceMetrics::new(series_from(start(), &values), None, 0.02).unwrap();
        assert_eq!(metrics.sortino_ratio(), 0.0);
    }

    #[test]
    fn test_sortino_ratio() {
        let metrics = metrics_with_market();
        let sortino = metrics.sortino_ratio();
        assert!(sortino.is_finite());
        assert!(sortino > 0.0);
    }

    #[test]
    fn test_max_drawdown_path() {
        let values = [0.0, 0.1, 0.9 / 1.1 - 1.0, 1.05 / 0.9 - 1.0];
        let returns = series_from(start(), &values);
        let dates = returns.dates();
        let metrics = PerformanceMetrics::new(returns, None, 0.02).unwrap();

        let dd = metrics.maximum_drawdown();
        assert_abs_diff_eq!(dd.max_drawdown, -0.181818, epsilon = 1e-6);
        assert_eq!(dd.peak_date, Some(dates[1]));
        assert_eq!(dd.trough_date, Some(dates[2]));
        assert!(dd.recovery_date.is_none());
        assert!(dd.recovery_days.is_none());
    }

    #[test]
    fn test_calmar_ratio() {
        let metrics = metrics_with_market();
        let expected = metrics.cagr() / metrics.maximum_drawdown().max_drawdown.abs();
        assert_abs_diff_eq!(metrics.calmar_ratio(), expected, epsilon = 1e-12);

        let no_dd = PerformanceMetrics::new(series_from(start(), &[0.01, 0.02]), None, 0.02)
            .unwrap();
        assert_eq!(no_dd.calmar_ratio(), 0.0);
    }

    #[test]
    fn test_var_and_cvar() {
        let metrics = metrics_with_market();
        let var = metrics.value_at_risk(0.05).unwrap();
        let cvar = metrics.conditional_var(0.05).unwrap();

        // Sorted: -0.02, -0.015, ... ; rank = 0.05 * 19 = 0.95
        assert_abs_diff_eq!(var, -0.02 + 0.95 * 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(cvar, -0.02, epsilon = 1e-12);
        assert!(cvar <= var);

        assert!(metrics.value_at_risk(0.0).is_err());
        assert!(metrics.conditional_var(1.5).is_err());
    }

    #[test]
    fn test_win_rate_uses_annual_returns() {
        let mut values = vec![0.01; 5];
        values.extend(vec![-0.01; 5]);
        let dates: Vec<NaiveDate> = [2018, 2019, 2020, 2021, 2022]
            .iter()
            .flat_map(|y| {
                [
                    NaiveDate::from_ymd_opt(*y, 3, 1).unwrap(),
                    NaiveDate::from_ymd_opt(*y, 9, 1).unwrap(),
                ]
            })
            .collect();
        // 2018..2022 get (0.01, 0.01), (0.01, 0.01), (0.01, -0.01), (-0.01, -0.01), (-0.01, -0.01)
        let returns = DailyReturnSeries::new(dates.into_iter().zip(values).collect()).unwrap();
        let metrics = PerformanceMetrics::new(returns, None, 0.02).unwrap();

        assert_eq!(metrics.annual_returns().len(), 5);
        assert_abs_diff_eq!(metrics.win_rate(), 0.4, epsilon = 1e-12);
        assert_eq!(metrics.best_year().unwrap().year, 2018);
        assert_eq!(metrics.worst_year().unwrap().year, 2021);
        assert_abs_diff_eq!(metrics.average_up_year(), 0.0201, epsilon = 1e-12);
        assert!(metrics.average_down_year() < 0.0);
    }

    #[test]
    fn test_average_years_default_to_zero() {
        let metrics =
            PerformanceMetrics::new(series_from(start(), &[0.01, 0.02]), None, 0.02).unwrap();
        assert_eq!(metrics.average_down_year(), 0.0);
    }

    #[test]
    fn test_pain_and_ulcer_index() {
        let values = [0.0, 0.1, 0.9 / 1.1 - 1.0, 1.05 / 0.9 - 1.0];
        let metrics = PerformanceMetrics::new(series_from(start(), &values), None, 0.02).unwrap();

        let dd2: f64 = 0.9 / 1.1 - 1.0;
        let dd3: f64 = 1.05 / 1.1 - 1.0;
        assert_abs_diff_eq!(metrics.pain_index(), (dd2 + dd3).abs() / 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            metrics.ulcer_index(),
            ((dd2 * dd2 + dd3 * dd3) / 4.0).sqrt(),
            epsilon = 1e-9
        );
        assert!(metrics.ulcer_index() >= metrics.pain_index());
    }

    #[test]
    fn test_beta() {
        let metrics = metrics_with_market();
        let beta = metrics.beta().unwrap();

        // Beta should be positive for correlated returns
        assert!(beta > 0.5 && beta < 2.0);
    }

    #[test]
    fn test_alpha_matches_capm() {
        let metrics = metrics_with_market();
        let beta = metrics.beta().unwrap();
        let market = series_from(start(), &create_market_returns());
        let market_cagr = (1.0 + market.total_return()).powf(252.0 / 20.0) - 1.0;
        let expected = metrics.cagr() - (0.02 + beta * (market_cagr - 0.02));
        assert_abs_diff_eq!(metrics.alpha().unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_r_squared_and_information_ratio() {
        let metrics = metrics_with_market();
        let r2 = metrics.r_squared().unwrap();
        assert!(r2 > 0.5 && r2 <= 1.0);

        let te = metrics.tracking_error().unwrap();
        assert!(te > 0.0 && te < 1.0);
        assert!(metrics.information_ratio().unwrap().is_finite());
        assert!(metrics.treynor_ratio().unwrap().is_finite());
    }

    #[test]
    fn test_benchmark_metrics_undefined_without_benchmark() {
        let metrics =
            PerformanceMetrics::new(series_from(start(), &create_test_returns()), None, 0.02)
                .unwrap();
        assert_eq!(metrics.beta(), None);
        assert_eq!(metrics.alpha(), None);
        assert_eq!(metrics.r_squared(), None);
        assert_eq!(metrics.treynor_ratio(), None);
        assert_eq!(metrics.information_ratio(), None);
    }

    #[test]
    fn test_benchmark_with_single_aligned_point_is_undefined() {
        let asset = series_from(start(), &create_test_returns());
        let late_start = asset.dates()[19];
        let benchmark = series_from(late_start, &[0.01, 0.02, 0.03]);

        let metrics = PerformanceMetrics::new(asset, Some(benchmark), 0.02).unwrap();
        assert_eq!(metrics.beta(), None);
        assert_eq!(metrics.r_squared(), None);
        assert_eq!(metrics.information_ratio(), None);
    }

    #[test]
    fn test_disjoint_benchmark_does_not_fail() {
        let asset = series_from(start(), &create_test_returns());
        let benchmark = series_from(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), &[0.01, 0.02]);
        let metrics = PerformanceMetrics::new(asset, Some(benchmark), 0.02).unwrap();
        assert_eq!(metrics.beta(), None);
        assert!(metrics.compute(DEFAULT_CONFIDENCE).is_ok());
    }

    #[test]
    fn test_asset_against_itself() {
        let returns = series_from(start(), &create_test_returns());
        let metrics = PerformanceMetrics::new(returns.clone(), Some(returns), 0.02).unwrap();

        assert_abs_diff_eq!(metrics.beta().unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.alpha().unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.r_squared().unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(metrics.information_ratio(), None);
    }

    #[test]
    fn test_zero_variance_benchmark_beta_undefined() {
        let asset = series_from(start(), &create_test_returns());
        let flat = series_from(start(), &[0.001; 20]);
        let metrics = PerformanceMetrics::new(asset, Some(flat), 0.02).unwrap();
        assert_eq!(metrics.beta(), None);
        assert_eq!(metrics.treynor_ratio(), None);
        assert_eq!(metrics.r_squared(), None);
    }

    #[test]
    fn test_compute_full_record() {
        let metrics = metrics_with_market();
        let result = metrics.compute(DEFAULT_CONFIDENCE).unwrap();

        assert_eq!(result.num_observations, 20);
        assert_abs_diff_eq!(result.num_years, 20.0 / 252.0, epsilon = 1e-12);
        assert_eq!(result.returns.cagr, metrics.cagr());
        assert_eq!(result.risk.confidence, 0.05);
        assert!(result.relative.beta.is_some());
        assert!(result.distribution.skewness.is_some());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["relative"]["beta"].is_number());
        assert!(json["risk"]["drawdown"]["max_drawdown"].is_number());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = metrics_with_market().compute(0.05).unwrap();
        let b = metrics_with_market().compute(0.05).unwrap();
        assert_eq!(a.returns.cagr.to_bits(), b.returns.cagr.to_bits());
        assert_eq!(a.risk.ulcer_index.to_bits(), b.risk.ulcer_index.to_bits());
        assert_eq!(a, b);
    }
}
