//! Aggregation and descriptive statistics for the crime statistics pipeline.
//!
//! Submodules:
//! - `grouping`: sums the metric per municipality.
//! - `summary`: quartiles, central tendency and dispersion.
//! - `outliers`: 1.5×IQR fence classification.
//! - `interpretation`: plain-language reading of the summary.

pub mod grouping;
pub mod interpretation;
pub mod outliers;
pub mod summary;

use thiserror::Error;

/// Errors raised while computing statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// There are no groups to summarize.
    #[error("No data: cannot compute statistics on an empty series")]
    NoData,
    /// A ratio statistic would divide by zero.
    #[error("{statistic} is undefined: {reason}")]
    Undefined {
        statistic: &'static str,
        reason: String,
    },
    /// A total is NaN or infinite.
    #[error("Non-finite total for '{0}'")]
    NonFinite(String),
}
