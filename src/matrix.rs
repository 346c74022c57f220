//! Year-by-year return matrices
//!
//! A [`ReturnMatrix`] holds, for every pair of years `start <= end` in an
//! annual return series, the chosen return metric over `[start, end]`
//! inclusive. Rows are ending years, columns are starting years. Cells with
//! `end < start` are `None`, never zero.
//!
//! Cells are stored as decimals in a dense `nalgebra` matrix indexed through
//! a sorted year list; [`ReturnMatrix::to_percent_rows`] converts for display.

use crate::error::{AnalyticsError, Result};
use crate::series::{round_percent, AnnualReturnSeries, YearValue};
use nalgebra::DMatrix;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Return metric computed for each `[start, end]` period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnMetric {
    /// Compound annual growth rate
    #[default]
    #[serde(rename = "CAGR")]
    Cagr,

    /// Compounded return over the whole period
    #[serde(rename = "Total Return")]
    TotalReturn,

    /// Total return divided by the number of years
    #[serde(rename = "Simple Annualized Return")]
    SimpleAnnualizedReturn,
}

impl ReturnMetric {
    /// Display label used by the presentation layer
    pub fn label(&self) -> &'static str {
        match self {
            ReturnMetric::Cagr => "CAGR",
            ReturnMetric::TotalReturn => "Total Return",
            ReturnMetric::SimpleAnnualizedReturn => "Simple Annualized Return",
        }
    }

    /// Metric value for a period of `num_years` years
    ///
    /// `growth` is `∏(1 + r)` over the period and `first` the return of its
    /// first year. Single-year CAGR and simple annualized return are the
    /// annual return itself, not a degenerate multi-year formula.
    fn period_value(&self, growth: f64, num_years: usize, first: f64) -> f64 {
        match self {
            ReturnMetric::Cagr if num_years == 1 => first,
            ReturnMetric::Cagr => growth.powf(1.0 / num_years as f64) - 1.0,
            ReturnMetric::TotalReturn => growth - 1.0,
            ReturnMetric::SimpleAnnualizedReturn if num_years == 1 => first,
            ReturnMetric::SimpleAnnualizedReturn => (growth - 1.0) / num_years as f64,
        }
    }
}

impl fmt::Display for ReturnMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReturnMetric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cagr" => Ok(ReturnMetric::Cagr),
            "total return" | "total_return" => Ok(ReturnMetric::TotalReturn),
            "simple annualized return" | "simple_annualized_return" | "simple annualized" => {
                Ok(ReturnMetric::SimpleAnnualizedReturn)
            }
            other => Err(AnalyticsError::InvalidParameter(format!(
                "unknown matrix metric: {}",
                other
            ))),
        }
    }
}

/// What the cells of a matrix represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixKind {
    /// Metric values for one series
    Returns,
    /// Primary minus benchmark
    Difference,
    /// Primary divided by benchmark (unitless)
    Ratio,
}

/// One displayed matrix row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub end_year: i32,
    pub cells: Vec<Option<f64>>,
}

/// Square year x year matrix of period returns
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    metric: ReturnMetric,
    kind: MatrixKind,
    years: Vec<i32>,
    index: HashMap<i32, usize>,
    // (row, col) = (end year index, start year index)
    cells: DMatrix<Option<f64>>,
}

impl ReturnMatrix {
    fn with_cells(
        metric: ReturnMetric,
        kind: MatrixKind,
        years: Vec<i32>,
        cells: DMatrix<Option<f64>>,
    ) -> Self {
        let index = years.iter().enumerate().map(|(i, y)| (*y, i)).collect();
        Self {
            metric,
            kind,
            years,
            index,
            cells,
        }
    }

    pub fn metric(&self) -> ReturnMetric {
        self.metric
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// Year labels (ascending), shared by rows and columns
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Value for the period `[start_year, end_year]`
    ///
    /// `None` when either year is absent, when `end_year < start_year`, or
    /// when the cell is undefined (e.g. a ratio over a zero benchmark).
    pub fn get(&self, end_year: i32, start_year: i32) -> Option<f64> {
        let row = *self.index.get(&end_year)?;
        let col = *self.index.get(&start_year)?;
        self.cells[(row, col)]
    }

    /// Diagonal cells as (year, value)
    pub fn diagonal(&self) -> Vec<YearValue> {
        self.years
            .iter()
            .enumerate()
            .filter_map(|(i, year)| {
                self.cells[(i, i)].map(|value| YearValue { year: *year, value })
            })
            .collect()
    }

    /// Rows for display, latest ending year first
    ///
    /// Return and difference cells are converted to percent; ratio cells are
    /// unitless. Everything is rounded to 2 decimals.
    pub fn to_percent_rows(&self) -> Vec<MatrixRow> {
        (0..self.years.len())
            .rev()
            .map(|row| MatrixRow {
                end_year: self.years[row],
                cells: (0..self.years.len())
                    .map(|col| self.cells[(row, col)].map(|v| self.display_value(v)))
                    .collect(),
            })
            .collect()
    }

    fn display_value(&self, value: f64) -> f64 {
        match self.kind {
            MatrixKind::Ratio => (value * 100.0).round() / 100.0,
            MatrixKind::Returns | MatrixKind::Difference => round_percent(value),
        }
    }

    /// Combine two matrices over the same years cell by cell
    fn combine<F>(&self, other: &ReturnMatrix, kind: MatrixKind, f: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        if self.years != other.years {
            return Err(AnalyticsError::InvalidParameter(
                "matrices cover different years".to_string(),
            ));
        }

        let cells = self.cells.zip_map(&other.cells, |a, b| match (a, b) {
            (Some(a), Some(b)) => f(a, b),
            _ => None,
        });

        Ok(Self::with_cells(self.metric, kind, self.years.clone(), cells))
    }
}

impl Serialize for ReturnMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ReturnMatrix", 4)?;
        state.serialize_field("metric", &self.metric)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("start_years", &self.years)?;
        state.serialize_field("rows", &self.to_percent_rows())?;
        state.end()
    }
}

/// Build the return matrix of `annual_returns` for `metric`
///
/// Bounds default to the first/last year of the series. Years outside the
/// bounds are omitted, not clamped. Fails with `NoData` for an empty input
/// or an empty year window, and `InvalidRange` when both bounds are given
/// and `start_year >= end_year`.
pub fn create_return_matrix(
    annual_returns: &AnnualReturnSeries,
    metric: ReturnMetric,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<ReturnMatrix> {
    if annual_returns.is_empty() {
        return Err(AnalyticsError::NoData(
            "annual return series is empty".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (start_year, end_year) {
        if start >= end {
            return Err(AnalyticsError::InvalidRange { start, end });
        }
    }

    let filtered = annual_returns.filter_years(start_year, end_year);
    if filtered.is_empty() {
        return Err(AnalyticsError::NoData(format!(
            "no annual returns between {:?} and {:?}",
            start_year, end_year
        )));
    }

    let years = filtered.years();
    let values: Vec<f64> = filtered.iter().map(|(_, r)| r).collect();
    let n = years.len();
    let mut cells = DMatrix::from_element(n, n, None);

    for start in 0..n {
        // Extending the period one year at a time multiplies in the same
        // order as compounding the slice [start, end] from scratch.
        let mut growth = 1.0;
        for end in start..n {
            growth *= 1.0 + values[end];
            let num_years = end - start + 1;
            cells[(end, start)] = Some(metric.period_value(growth, num_years, values[start]));
        }
    }

    tracing::debug!(metric = %metric, years = n, "built return matrix");

    Ok(ReturnMatrix::with_cells(metric, MatrixKind::Returns, years, cells))
}

/// Restrict both series to their common years (ascending)
///
/// Fails with `NoOverlap` when they share no year.
pub fn align_series(
    primary: &AnnualReturnSeries,
    benchmark: &AnnualReturnSeries,
) -> Result<(AnnualReturnSeries, AnnualReturnSeries)> {
    let common: Vec<i32> = primary
        .years()
        .into_iter()
        .filter(|y| benchmark.get(*y).is_some())
        .collect();

    if common.is_empty() {
        return Err(AnalyticsError::NoOverlap(
            "no overlapping years between the two series".to_string(),
        ));
    }

    Ok((primary.restrict_to(&common), benchmark.restrict_to(&common)))
}

/// Primary, benchmark and the derived comparison matrices over aligned years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMatrices {
    pub primary: ReturnMatrix,
    pub benchmark: ReturnMatrix,
    pub difference: ReturnMatrix,
    pub ratio: ReturnMatrix,
}

/// Align the two series and build all four matrices
pub fn create_comparison(
    primary: &AnnualReturnSeries,
    benchmark: &AnnualReturnSeries,
    metric: ReturnMetric,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<ComparisonMatrices> {
    let (primary, benchmark) = align_series(primary, benchmark)?;
    let primary = create_return_matrix(&primary, metric, start_year, end_year)?;
    let benchmark = create_return_matrix(&benchmark, metric, start_year, end_year)?;
    let difference = primary.combine(&benchmark, MatrixKind::Difference, difference_cell)?;
    let ratio = primary.combine(&benchmark, MatrixKind::Ratio, ratio_cell)?;

    Ok(ComparisonMatrices {
        primary,
        benchmark,
        difference,
        ratio,
    })
}

/// `primary - benchmark` per cell over the aligned years
pub fn create_difference_matrix(
    primary: &AnnualReturnSeries,
    benchmark: &AnnualReturnSeries,
    metric: ReturnMetric,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<ReturnMatrix> {
    let (a, b) = aligned_matrices(primary, benchmark, metric, start_year, end_year)?;
    a.combine(&b, MatrixKind::Difference, difference_cell)
}

/// `primary / benchmark` per cell over the aligned years
///
/// Division by zero yields `None`, never an infinity.
pub fn create_ratio_matrix(
    primary: &AnnualReturnSeries,
    benchmark: &AnnualReturnSeries,
    metric: ReturnMetric,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<ReturnMatrix> {
    let (a, b) = aligned_matrices(primary, benchmark, metric, start_year, end_year)?;
    a.combine(&b, MatrixKind::Ratio, ratio_cell)
}

fn aligned_matrices(
    primary: &AnnualReturnSeries,
    benchmark: &AnnualReturnSeries,
    metric: ReturnMetric,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<(ReturnMatrix, ReturnMatrix)> {
    let (primary, benchmark) = align_series(primary, benchmark)?;
    Ok((
        create_return_matrix(&primary, metric, start_year, end_year)?,
        create_return_matrix(&benchmark, metric, start_year, end_year)?,
    ))
}

fn difference_cell(a: f64, b: f64) -> Option<f64> {
    Some(a - b)
}

fn ratio_cell(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        return None;
    }
    let ratio = a / b;
    ratio.is_finite().then_some(ratio)
}

/// A period value with its year span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub start_year: i32,
    pub end_year: i32,
    /// Calendar span `end_year - start_year + 1`
    pub years: i32,
    pub value: f64,
}

/// Headline figures read off a return matrix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub best_single_year: Option<YearValue>,
    pub worst_single_year: Option<YearValue>,
    /// Ten calendar years ending at the last year, when the start year is present
    pub ten_year: Option<PeriodValue>,
    /// First year to last year
    pub full_period: Option<PeriodValue>,
}

impl MatrixSummary {
    pub fn from_matrix(matrix: &ReturnMatrix) -> Self {
        let diagonal = matrix.diagonal();

        // First occurrence wins on ties.
        let best_single_year = diagonal.iter().fold(None, |best: Option<YearValue>, yv| {
            match best {
                Some(b) if b.value >= yv.value => Some(b),
                _ => Some(*yv),
            }
        });
        let worst_single_year = diagonal.iter().fold(None, |worst: Option<YearValue>, yv| {
            match worst {
                Some(w) if w.value <= yv.value => Some(w),
                _ => Some(*yv),
            }
        });

        let period = |start_year: i32, end_year: i32| {
            matrix.get(end_year, start_year).map(|value| PeriodValue {
                start_year,
                end_year,
                years: end_year - start_year + 1,
                value,
            })
        };

        let (ten_year, full_period) = match (matrix.years().first(), matrix.years().last()) {
            (Some(&first), Some(&last)) => {
                let ten_start = last - 9;
                let ten_year = if ten_start >= first {
                    period(ten_start, last)
                } else {
                    None
                };
                (ten_year, period(first, last))
            }
            _ => (None, None),
        };

        Self {
            best_single_year,
            worst_single_year,
            ten_year,
            full_period,
        }
    }
}
