//! Core data types for the ISP crime statistics pipeline.
//!
//! This module defines the shared domain model imported by all other modules:
//! raw records, per-municipality totals, summary statistics and outlier sets.
//! It contains no I/O; the only logic is ordering and filtering of totals.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Grouping column of the ISP monthly dataset (municipality name).
pub const COLUMN_MUNICIPALITY: &str = "munic";

/// Vehicle theft count column.
pub const COLUMN_VEHICLE_THEFT: &str = "roubo_veiculo";

/// Fraud count column.
pub const COLUMN_FRAUD: &str = "estelionato";

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One row of the fetched dataset, reduced to the two columns of interest.
///
/// `value` is `None` when the metric cell was empty. Such cells are skipped
/// during aggregation rather than counted as zero-valued observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub municipality: String,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Grouped totals
// ---------------------------------------------------------------------------

/// Summed metric for a single municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub municipality: String,
    pub total: f64,
}

impl GroupTotal {
    pub fn new(municipality: impl Into<String>, total: f64) -> Self {
        Self {
            municipality: municipality.into(),
            total,
        }
    }
}

/// Direction used when ranking groups for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One entry per distinct municipality, ordered by municipality name.
///
/// Produced by `analysis::grouping::group_and_sum`. The sum of all totals
/// equals the sum of the raw metric column it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupedSeries {
    groups: Vec<GroupTotal>,
}

impl GroupedSeries {
    /// Builds a series from already-grouped totals, ordering them by name.
    pub fn new(mut groups: Vec<GroupTotal>) -> Self {
        groups.sort_by(|a, b| a.municipality.cmp(&b.municipality));
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[GroupTotal] {
        &self.groups
    }

    pub fn values(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.total).collect()
    }

    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    /// First `n` groups in name order, for a quick sanity preview.
    pub fn head(&self, n: usize) -> &[GroupTotal] {
        &self.groups[..n.min(self.groups.len())]
    }

    pub fn find(&self, municipality: &str) -> Option<&GroupTotal> {
        self.groups.iter().find(|g| g.municipality == municipality)
    }

    /// Groups matching `keep`, ranked by total. Ties fall back to name order.
    pub fn select_sorted<F>(&self, keep: F, order: SortOrder) -> Vec<GroupTotal>
    where
        F: Fn(f64) -> bool,
    {
        let mut selected: Vec<GroupTotal> = self
            .groups
            .iter()
            .filter(|g| keep(g.total))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            let by_total = match order {
                SortOrder::Ascending => a.total.total_cmp(&b.total),
                SortOrder::Descending => b.total.total_cmp(&a.total),
            };
            by_total.then_with(|| a.municipality.cmp(&b.municipality))
        });
        selected
    }

    /// Groups strictly below `threshold`, lowest first.
    pub fn below(&self, threshold: f64) -> Vec<GroupTotal> {
        self.select_sorted(|v| v < threshold, SortOrder::Ascending)
    }

    /// Groups strictly above `threshold`, highest first.
    pub fn above(&self, threshold: f64) -> Vec<GroupTotal> {
        self.select_sorted(|v| v > threshold, SortOrder::Descending)
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Quantile estimator used for Q1/Q2/Q3.
///
/// `Linear` is Hyndman & Fan type 7 (position `(n - 1)p`), the NumPy default.
/// `Weibull` is type 6 (position `(n + 1)p`, 1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantileMethod {
    #[default]
    Linear,
    Weibull,
}

impl std::fmt::Display for QuantileMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantileMethod::Linear => write!(f, "linear"),
            QuantileMethod::Weibull => write!(f, "weibull"),
        }
    }
}

impl std::str::FromStr for QuantileMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "type7" => Ok(QuantileMethod::Linear),
            "weibull" | "type6" => Ok(QuantileMethod::Weibull),
            other => Err(format!("unknown quantile method '{}'", other)),
        }
    }
}

/// Descriptive statistics over the grouped totals.
///
/// Computed once per run by `analysis::summary::summarize`; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub quantile_method: QuantileMethod,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Population variance (divides by `n`).
    pub variance: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    /// `|mean - median| / median`
    pub relative_distance: f64,
    /// `variance / mean²`
    pub variance_to_mean_squared: f64,
}

/// Groups outside the 1.5×IQR fences.
///
/// `lower` is ordered lowest first, `upper` highest first. The two sets are
/// disjoint because `lower_bound <= upper_bound` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierSets {
    pub lower: Vec<GroupTotal>,
    pub upper: Vec<GroupTotal>,
}

impl OutlierSets {
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty() && self.upper.is_empty()
    }

    pub fn count(&self) -> usize {
        self.lower.len() + self.upper.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> GroupedSeries {
        GroupedSeries::new(vec![
            GroupTotal::new("Niterói", 10.0),
            GroupTotal::new("Angra dos Reis", 2.0),
            GroupTotal::new("Rio de Janeiro", 50.0),
            GroupTotal::new("Belford Roxo", 2.0),
            GroupTotal::new("Cabo Frio", 2.0),
        ])
    }

    #[test]
    fn test_series_is_ordered_by_municipality() {
        let series = sample_series();
        let names: Vec<_> = series.groups().iter().map(|g| g.municipality.as_str()).collect();
        assert_eq!(
            names,
            ["Angra dos Reis", "Belford Roxo", "Cabo Frio", "Niterói", "Rio de Janeiro"]
        );
    }

    #[test]
    fn test_head_is_clamped_to_series_length() {
        let series = sample_series();
        assert_eq!(series.head(3).len(), 3);
        assert_eq!(series.head(100).len(), 5);
        assert!(GroupedSeries::default().head(5).is_empty());
    }

    #[test]
    fn test_below_is_ascending_and_strict() {
        let series = sample_series();
        let below = series.below(10.0);
        assert_eq!(below.len(), 3, "10.0 itself must not be included");
        assert!(below.iter().all(|g| g.total == 2.0));
        // ties keep name order
        assert_eq!(below[0].municipality, "Angra dos Reis");
    }

    #[test]
    fn test_above_is_descending() {
        let series = sample_series();
        let above = series.above(2.0);
        let totals: Vec<f64> = above.iter().map(|g| g.total).collect();
        assert_eq!(totals, vec![50.0, 10.0]);
    }

    #[test]
    fn test_total_and_find() {
        let series = sample_series();
        assert_eq!(series.total(), 66.0);
        assert_eq!(series.find("Niterói").map(|g| g.total), Some(10.0));
        assert!(series.find("Paraty").is_none());
    }

    #[test]
    fn test_quantile_method_parsing() {
        assert_eq!("linear".parse::<QuantileMethod>(), Ok(QuantileMethod::Linear));
        assert_eq!(" Weibull ".parse::<QuantileMethod>(), Ok(QuantileMethod::Weibull));
        assert!("hazen".parse::<QuantileMethod>().is_err());
        assert_eq!(QuantileMethod::default(), QuantileMethod::Linear);
    }
}
