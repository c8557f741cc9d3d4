//! Descriptive statistics over per-municipality totals.
//!
//! All functions are pure. Quartiles use the estimator selected by
//! `QuantileMethod`; the median is always the midpoint median, which both
//! supported estimators agree with at p = 0.5.

use super::StatsError;
use crate::model::{GroupedSeries, QuantileMethod, SummaryStatistics};

/// Tukey fence multiplier applied to the IQR.
pub const FENCE_FACTOR: f64 = 1.5;

// ---------------------------------------------------------------------------
// Order statistics
// ---------------------------------------------------------------------------

/// Totals in non-decreasing order. Fails on NaN or infinite totals.
pub fn sorted_totals(series: &GroupedSeries) -> Result<Vec<f64>, StatsError> {
    if let Some(bad) = series.groups().iter().find(|g| !g.total.is_finite()) {
        return Err(StatsError::NonFinite(bad.municipality.clone()));
    }
    let mut values = series.values();
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Computes the `p`-th quantile on pre-sorted data.
///
/// For `Linear` the zero-based position is `(n - 1)p`; for `Weibull` it is
/// `(n + 1)p - 1`, clamped to the sample. Values between two order
/// statistics are linearly interpolated.
///
/// Returns `None` if `sorted` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64, method: QuantileMethod) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let last = (n - 1) as f64;
    let h = match method {
        QuantileMethod::Linear => last * p,
        QuantileMethod::Weibull => ((n + 1) as f64 * p - 1.0).clamp(0.0, last),
    };
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted[n - 1])
    } else {
        Some(sorted[j] + g * (sorted[j + 1] - sorted[j]))
    }
}

/// Midpoint median of pre-sorted data.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        None
    } else if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Compute the full set of descriptive statistics for a grouped series.
///
/// # Errors
/// - `NoData` for an empty series.
/// - `NonFinite` if any total is NaN or infinite.
/// - `Undefined` when the mean (coefficient of variation) or the median
///   (relative mean–median distance) is zero.
pub fn summarize(
    series: &GroupedSeries,
    method: QuantileMethod,
) -> Result<SummaryStatistics, StatsError> {
    if series.is_empty() {
        return Err(StatsError::NoData);
    }
    let sorted = sorted_totals(series)?;
    let n = sorted.len() as f64;

    let quartile = |p: f64| quantile_sorted(&sorted, p, method).ok_or(StatsError::NoData);
    let q1 = quartile(0.25)?;
    let q2 = quartile(0.50)?;
    let q3 = quartile(0.75)?;
    let iqr = q3 - q1;

    let median = median_sorted(&sorted).ok_or(StatsError::NoData)?;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if mean == 0.0 {
        return Err(StatsError::Undefined {
            statistic: "coefficient of variation",
            reason: "the mean of the totals is zero".to_string(),
        });
    }
    if median == 0.0 {
        return Err(StatsError::Undefined {
            statistic: "mean-median distance",
            reason: "the median of the totals is zero".to_string(),
        });
    }

    Ok(SummaryStatistics {
        count: sorted.len(),
        quantile_method: method,
        mean,
        median,
        q1,
        q2,
        q3,
        iqr,
        lower_bound: q1 - FENCE_FACTOR * iqr,
        upper_bound: q3 + FENCE_FACTOR * iqr,
        min,
        max,
        range: max - min,
        variance,
        std_dev,
        coefficient_of_variation: std_dev / mean,
        relative_distance: ((mean - median) / median).abs(),
        variance_to_mean_squared: variance / (mean * mean),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
