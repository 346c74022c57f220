//! Price and return series
//!
//! The data flow is `PriceSeries` -> `DailyReturnSeries` -> `AnnualReturnSeries`.
//! All values are decimals (0.05 = 5%); percentages only appear in the
//! `to_percentages` presentation helper.

use crate::error::{AnalyticsError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidParameter(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering whole calendar years `[start_year, end_year]`
    pub fn from_years(start_year: i32, end_year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or_else(|| {
            AnalyticsError::InvalidParameter(format!("year {} out of range", start_year))
        })?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31).ok_or_else(|| {
            AnalyticsError::InvalidParameter(format!("year {} out of range", end_year))
        })?;
        Self::new(start, end)
    }

    /// The `years * 365` days ending at `today`
    ///
    /// `today` is always supplied by the caller so repeated runs stay
    /// reproducible. Fails with `InvalidParameter` when the start would fall
    /// outside the representable calendar.
    pub fn trailing_years(today: NaiveDate, years: u32) -> Result<Self> {
        let start = today
            .checked_sub_signed(Duration::days(365 * i64::from(years)))
            .ok_or_else(|| {
                AnalyticsError::InvalidParameter(format!(
                    "{} years before {} is out of range",
                    years, today
                ))
            })?;
        Ok(Self { start, end: today })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One adjusted close observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adjusted_close: f64,
}

/// Daily adjusted close prices, strictly increasing by date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a price series
    ///
    /// Dates must be strictly increasing and prices finite and positive.
    /// An empty series is allowed; deriving returns from it fails with
    /// [`AnalyticsError::NoData`].
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let mut out = Vec::with_capacity(points.len());
        for (date, price) in points {
            if !price.is_finite() || price <= 0.0 {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "adjusted close on {} must be positive, got {}",
                    date, price
                )));
            }
            check_increasing(out.last().map(|p: &PricePoint| p.date), date)?;
            out.push(PricePoint {
                date,
                adjusted_close: price,
            });
        }
        Ok(Self { points: out })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Restrict to the prices whose date lies inside `range`
    pub fn slice(&self, range: &DateRange) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.date))
                .copied()
                .collect(),
        }
    }

    /// Simple daily returns `p[i] / p[i-1] - 1`, dated by the later price
    ///
    /// The first price has no return. Fails with `NoData` when fewer than
    /// two prices are available.
    pub fn daily_returns(&self) -> Result<DailyReturnSeries> {
        if self.points.len() < 2 {
            return Err(AnalyticsError::NoData(format!(
                "need at least 2 prices to derive returns, got {}",
                self.points.len()
            )));
        }

        let returns = self
            .points
            .windows(2)
            .map(|w| DailyReturn {
                date: w[1].date,
                value: w[1].adjusted_close / w[0].adjusted_close - 1.0,
            })
            .collect();

        Ok(DailyReturnSeries { returns })
    }
}

/// One daily return observation (decimal)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily returns keyed by trading date
///
/// Gaps (weekends, holidays) are simply absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyReturnSeries {
    returns: Vec<DailyReturn>,
}

/// Asset and benchmark returns restricted to their common dates
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    pub dates: Vec<NaiveDate>,
    pub asset: Vec<f64>,
    pub benchmark: Vec<f64>,
}

impl AlignedReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl DailyReturnSeries {
    /// Build a daily return series
    ///
    /// Non-finite values (missing observations) are dropped. Dates must be
    /// strictly increasing.
    pub fn new(returns: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let mut out: Vec<DailyReturn> = Vec::with_capacity(returns.len());
        for (date, value) in returns {
            if !value.is_finite() {
                continue;
            }
            check_increasing(out.last().map(|r| r.date), date)?;
            out.push(DailyReturn { date, value });
        }
        Ok(Self { returns: out })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyReturn> {
        self.returns.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.returns.iter().map(|r| r.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.returns.iter().map(|r| r.date).collect()
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Keep returns whose calendar year lies in `[start, end]` (either bound optional)
    pub fn filter_years(&self, start: Option<i32>, end: Option<i32>) -> Self {
        Self {
            returns: self
                .returns
                .iter()
                .filter(|r| year_in_bounds(r.date.year(), start, end))
                .copied()
                .collect(),
        }
    }

    /// `∏(1 + r) - 1` over the whole series
    pub fn total_return(&self) -> f64 {
        compound(self.returns.iter().map(|r| r.value))
    }

    /// Compounded return per calendar year of the return's own date
    ///
    /// Years without observations are absent. Values are unrounded decimals.
    pub fn compound_by_year(&self) -> BTreeMap<i32, f64> {
        let mut growth: BTreeMap<i32, f64> = BTreeMap::new();
        for r in &self.returns {
            *growth.entry(r.date.year()).or_insert(1.0) *= 1.0 + r.value;
        }
        growth.into_iter().map(|(year, g)| (year, g - 1.0)).collect()
    }

    /// Inner join with `other` on date
    ///
    /// Both series are sorted, so this is a single merge pass. Fails with
    /// `NoOverlap` when no date is shared.
    pub fn align(&self, other: &DailyReturnSeries) -> Result<AlignedReturns> {
        let mut aligned = AlignedReturns {
            dates: Vec::new(),
            asset: Vec::new(),
            benchmark: Vec::new(),
        };

        let (mut i, mut j) = (0, 0);
        while i < self.returns.len() && j < other.returns.len() {
            let (a, b) = (&self.returns[i], &other.returns[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    aligned.dates.push(a.date);
                    aligned.asset.push(a.value);
                    aligned.benchmark.push(b.value);
                    i += 1;
                    j += 1;
                }
            }
        }

        if aligned.is_empty() {
            return Err(AnalyticsError::NoOverlap(
                "daily return series share no dates".to_string(),
            ));
        }

        Ok(aligned)
    }
}

/// Compounded return per calendar year (decimal), keyed by year
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnualReturnSeries {
    returns: BTreeMap<i32, f64>,
}

impl AnnualReturnSeries {
    /// Aggregate daily returns into calendar-year returns
    ///
    /// Each year is compounded over the days available in it (partial first
    /// and last years included) and rounded to two decimals in percent.
    pub fn from_daily(daily: &DailyReturnSeries) -> Result<Self> {
        if daily.is_empty() {
            return Err(AnalyticsError::NoData(
                "cannot aggregate an empty daily return series".to_string(),
            ));
        }

        let returns: BTreeMap<i32, f64> = daily
            .compound_by_year()
            .into_iter()
            .map(|(year, r)| (year, round_percent(r) / 100.0))
            .collect();

        tracing::debug!(
            observations = daily.len(),
            years = returns.len(),
            "aggregated daily returns by year"
        );

        Ok(Self { returns })
    }

    /// Build from decimal annual returns
    pub fn from_decimals<I>(returns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let mut out = BTreeMap::new();
        for (year, value) in returns {
            if !value.is_finite() {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "annual return for {} is not finite",
                    year
                )));
            }
            if out.insert(year, value).is_some() {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "duplicate annual return for {}",
                    year
                )));
            }
        }
        Ok(Self { returns: out })
    }

    /// Build from percentage annual returns (12.5 = 12.5%)
    pub fn from_percentages<I>(returns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Self::from_decimals(returns.into_iter().map(|(y, pct)| (y, pct / 100.0)))
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.returns.get(&year).copied()
    }

    /// Years in ascending order
    pub fn years(&self) -> Vec<i32> {
        self.returns.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.returns.iter().map(|(y, r)| (*y, *r))
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.returns.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.returns.keys().next_back().copied()
    }

    /// Keep years in `[start, end]`; bounds outside the data just omit years
    pub fn filter_years(&self, start: Option<i32>, end: Option<i32>) -> Self {
        Self {
            returns: self
                .returns
                .iter()
                .filter(|(y, _)| year_in_bounds(**y, start, end))
                .map(|(y, r)| (*y, *r))
                .collect(),
        }
    }

    /// Keep only `years`
    pub(crate) fn restrict_to(&self, years: &[i32]) -> Self {
        Self {
            returns: years
                .iter()
                .filter_map(|y| self.returns.get(y).map(|r| (*y, *r)))
                .collect(),
        }
    }

    /// Year -> percent, rounded to 2 decimals
    pub fn to_percentages(&self) -> BTreeMap<i32, f64> {
        self.returns
            .iter()
            .map(|(y, r)| (*y, round_percent(*r)))
            .collect()
    }
}

/// A value labelled with the calendar year it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// `∏(1 + r) - 1`
pub(crate) fn compound<I: IntoIterator<Item = f64>>(returns: I) -> f64 {
    returns.into_iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Decimal to percent, rounded to 2 decimals
pub(crate) fn round_percent(decimal: f64) -> f64 {
    (decimal * 10_000.0).round() / 100.0
}

fn year_in_bounds(year: i32, start: Option<i32>, end: Option<i32>) -> bool {
    start.map_or(true, |s| year >= s) && end.map_or(true, |e| year <= e)
}

fn check_increasing(previous: Option<NaiveDate>, date: NaiveDate) -> Result<()> {
    match previous {
        Some(prev) if date <= prev => Err(AnalyticsError::InvalidParameter(format!(
            "dates must be strictly increasing: {} follows {}",
            date, prev
        ))),
        _ => Ok(()),
    }
}
