//! Sample statistics over return slices
//!
//! Dispersion uses the sample (n - 1) convention via `statrs`. Skewness and
//! kurtosis use biased population moments; kurtosis is reported as excess
//! kurtosis (normal = 0).

use statrs::statistics::Statistics;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.mean())
}

/// Sample standard deviation, `None` below two observations
///
/// Exactly 0 for a sample without spread, including the rounding residue
/// `statrs` leaves on a constant series.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_flat(values) {
        return Some(0.0);
    }
    let std = values.std_dev();
    if !std.is_finite() {
        return None;
    }
    if std <= rounding_floor(values) {
        return Some(0.0);
    }
    Some(std)
}

/// Sample covariance of two equally long slices
///
/// Exactly 0 when either side has no spread.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    if sample_std(a)? == 0.0 || sample_std(b)? == 0.0 {
        return Some(0.0);
    }
    let cov = a.covariance(b);
    cov.is_finite().then_some(cov)
}

fn is_flat(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Dispersion below `n * EPSILON * |mean|` is summation error, not spread
fn rounding_floor(values: &[f64]) -> f64 {
    values.len() as f64 * f64::EPSILON * values.mean().abs()
}

/// Pearson correlation, `None` when either side has zero dispersion
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let cov = sample_covariance(a, b)?;
    let denom = sample_std(a)? * sample_std(b)?;
    if denom == 0.0 {
        return None;
    }
    let corr = cov / denom;
    corr.is_finite().then_some(corr)
}

/// Root mean square
pub fn root_mean_square(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.quadratic_mean())
}

/// Percentile `q` in [0, 1] with linear interpolation between order statistics
///
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Third standardized moment (biased)
pub fn skewness(values: &[f64]) -> Option<f64> {
    let (m2, m3, _) = central_moments(values)?;
    Some(m3 / m2.powf(1.5))
}

/// Fourth standardized moment minus 3 (biased)
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let (m2, _, m4) = central_moments(values)?;
    Some(m4 / (m2 * m2) - 3.0)
}

/// Population central moments (m2, m3, m4); `None` when undefined
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.mean();
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for x in values {
        let d = x - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);

    // Same cutoff scipy applies for a numerically constant sample
    if is_flat(values) || m2 <= (f64::EPSILON * mean).powi(2) {
        return None;
    }
    Some((m2, m3, m4))
}
