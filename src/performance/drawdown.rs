//! Drawdown path analysis on the compounded wealth curve

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum drawdown with its peak, trough and recovery
///
/// Recovery fields stay `None` while the wealth curve has not regained the
/// pre-drawdown peak by the end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    /// Most negative `wealth / peak - 1` (0 for a curve that never falls)
    pub max_drawdown: f64,

    /// Date the wealth curve set the peak preceding the trough
    pub peak_date: Option<NaiveDate>,

    /// Date of the maximum drawdown
    pub trough_date: Option<NaiveDate>,

    /// First date at or after the trough where wealth is back at the peak
    pub recovery_date: Option<NaiveDate>,

    /// Calendar days from trough to recovery
    pub recovery_days: Option<i64>,
}

/// Wealth curve `∏(1 + r)` and its drawdown series
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct DrawdownPath {
    pub wealth: Vec<f64>,
    pub drawdowns: Vec<f64>,
}

impl DrawdownPath {
    pub fn from_returns(returns: &[f64]) -> Self {
        let mut wealth = Vec::with_capacity(returns.len());
        let mut drawdowns = Vec::with_capacity(returns.len());
        let mut level = 1.0;
        let mut peak = f64::NEG_INFINITY;

        for r in returns {
            level *= 1.0 + r;
            peak = peak.max(level);
            wealth.push(level);
            drawdowns.push(level / peak - 1.0);
        }

        Self { wealth, drawdowns }
    }

    /// Locate the maximum drawdown and its recovery
    ///
    /// `dates` must line up with the returns the path was built from. Ties go
    /// to the earliest index for both the peak and the trough.
    pub fn analyze(&self, dates: &[NaiveDate]) -> DrawdownAnalysis {
        if self.wealth.is_empty() || dates.len() != self.wealth.len() {
            return DrawdownAnalysis::default();
        }

        let mut peak_idx = 0;
        let mut peak_at_trough = 0;
        let mut trough_idx = 0;
        let mut max_dd = self.drawdowns[0];

        for i in 1..self.wealth.len() {
            if self.wealth[i] > self.wealth[peak_idx] {
                peak_idx = i;
            }
            if self.drawdowns[i] < max_dd {
                max_dd = self.drawdowns[i];
                trough_idx = i;
                peak_at_trough = peak_idx;
            }
        }

        let peak_value = self.wealth[peak_at_trough];
        let recovery_idx = (trough_idx..self.wealth.len()).find(|&i| self.wealth[i] >= peak_value);

        let trough_date = dates[trough_idx];
        let recovery_date = recovery_idx.map(|i| dates[i]);

        DrawdownAnalysis {
            max_drawdown: max_dd,
            peak_date: Some(dates[peak_at_trough]),
            trough_date: Some(trough_date),
            recovery_date,
            recovery_days: recovery_date.map(|d| (d - trough_date).num_days()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    fn returns_for_path(path: &[f64]) -> Vec<f64> {
        let mut prev = 1.0;
        path.iter()
            .map(|w| {
                let r = w / prev - 1.0;
                prev = *w;
                r
            })
            .collect()
    }

    #[test]
    fn test_unrecovered_drawdown() {
        let returns = returns_for_path(&[1.0, 1.1, 0.9, 1.05]);
        let path = DrawdownPath::from_returns(&returns);
        let d = dates(4);

        let analysis = path.analyze(&d);
        assert_abs_diff_eq!(analysis.max_drawdown, 0.9 / 1.1 - 1.0, epsilon = 1e-12);
        assert_eq!(analysis.peak_date, Some(d[1]));
        assert_eq!(analysis.trough_date, Some(d[2]));
        assert_eq!(analysis.recovery_date, None);
        assert_eq!(analysis.recovery_days, None);
    }

    #[test]
    fn test_recovered_drawdown_counts_calendar_days() {
        let returns = returns_for_path(&[1.0, 1.1, 0.9, 1.0, 1.2]);
        let path = DrawdownPath::from_returns(&returns);
        let d = vec![
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 4).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 7).unwrap(),
        ];

        let analysis = path.analyze(&d);
        assert_eq!(analysis.recovery_date, Some(d[4]));
        assert_eq!(analysis.recovery_days, Some(4));
    }

    #[test]
    fn test_monotonic_curve_has_no_drawdown() {
        let path = DrawdownPath::from_returns(&[0.01, 0.02, 0.03]);
        let d = dates(3);
        let analysis = path.analyze(&d);
        assert_eq!(analysis.max_drawdown, 0.0);
        assert_eq!(analysis.trough_date, Some(d[0]));
        assert_eq!(analysis.recovery_days, Some(0));
        assert!(path.drawdowns.iter().all(|dd| *dd == 0.0));
    }

    #[test]
    fn test_first_day_loss_measured_from_first_close() {
        // The running peak starts at the first compounded value, not at 1.0.
        let path = DrawdownPath::from_returns(&[-0.5, 0.1]);
        assert_eq!(path.drawdowns[0], 0.0);
    }

    #[test]
    fn test_empty_path() {
        let path = DrawdownPath::from_returns(&[]);
        assert_eq!(path.analyze(&[]), DrawdownAnalysis::default());
    }
}
