//! Plain-language reading of a summary.
//!
//! Thresholds for the mean–median distance: below 10% the distribution is
//! treated as symmetric, up to 25% as moderately skewed, above that as
//! strongly skewed (the mean is being pulled by extreme municipalities).

use serde::Serialize;

use crate::model::{OutlierSets, SummaryStatistics};

pub const SYMMETRIC_MAX: f64 = 0.10;
pub const MODERATE_SKEW_MAX: f64 = 0.25;

pub const LOW_DISPERSION_MAX: f64 = 0.15;
pub const MODERATE_DISPERSION_MAX: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Skewness {
    Symmetric,
    Moderate,
    Strong,
}

impl Skewness {
    /// Classify from `|mean - median| / median`.
    pub fn classify(relative_distance: f64) -> Self {
        if relative_distance < SYMMETRIC_MAX {
            Skewness::Symmetric
        } else if relative_distance <= MODERATE_SKEW_MAX {
            Skewness::Moderate
        } else {
            Skewness::Strong
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Skewness::Symmetric => "distribution is roughly symmetric; the mean is representative",
            Skewness::Moderate => {
                "distribution is moderately asymmetric; extreme values may be influencing the mean"
            }
            Skewness::Strong => {
                "distribution is strongly asymmetric; the mean is dominated by extreme values"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispersion {
    Low,
    Moderate,
    High,
}

impl Dispersion {
    /// Classify from the magnitude of the coefficient of variation.
    pub fn classify(coefficient_of_variation: f64) -> Self {
        let cv = coefficient_of_variation.abs();
        if cv <= LOW_DISPERSION_MAX {
            Dispersion::Low
        } else if cv <= MODERATE_DISPERSION_MAX {
            Dispersion::Moderate
        } else {
            Dispersion::High
        }
    }
}

/// Verdict printed at the end of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub skewness: Skewness,
    pub dispersion: Dispersion,
    pub remarks: Vec<String>,
}

pub fn interpret(stats: &SummaryStatistics, outliers: &OutlierSets) -> Interpretation {
    let skewness = Skewness::classify(stats.relative_distance);
    let dispersion = Dispersion::classify(stats.coefficient_of_variation);

    let mut remarks = vec![format!(
        "Mean-median distance {:.2}%: {}.",
        stats.relative_distance * 100.0,
        skewness.describe()
    )];

    remarks.push(match dispersion {
        Dispersion::Low => format!(
            "Coefficient of variation {:.4}: totals are homogeneous across municipalities.",
            stats.coefficient_of_variation
        ),
        Dispersion::Moderate => format!(
            "Coefficient of variation {:.4}: totals vary moderately across municipalities.",
            stats.coefficient_of_variation
        ),
        Dispersion::High => format!(
            "Coefficient of variation {:.4}: the data is highly dispersed, so the mean \
             should not be taken as a typical value; prefer the median and quartiles.",
            stats.coefficient_of_variation
        ),
    });

    if !outliers.is_empty() {
        let (noun, verb) = if outliers.count() == 1 {
            ("municipality", "falls")
        } else {
            ("municipalities", "fall")
        };
        remarks.push(format!(
            "{} {} {} outside the 1.5×IQR fences ({} lower, {} upper).",
            outliers.count(),
            noun,
            verb,
            outliers.lower.len(),
            outliers.upper.len()
        ));
    }

    Interpretation {
        skewness,
        dispersion,
        remarks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupTotal;

    #[test]
    fn test_skewness_thresholds() {
        assert_eq!(Skewness::classify(0.0), Skewness::Symmetric);
        assert_eq!(Skewness::classify(0.099), Skewness::Symmetric);
        assert_eq!(Skewness::classify(0.10), Skewness::Moderate);
        assert_eq!(Skewness::classify(0.25), Skewness::Moderate);
        assert_eq!(Skewness::classify(0.26), Skewness::Strong);
    }

    #[test]
    fn test_dispersion_thresholds() {
        assert_eq!(Dispersion::classify(0.15), Dispersion::Low);
        assert_eq!(Dispersion::classify(0.2), Dispersion::Moderate);
        assert_eq!(Dispersion::classify(2.5), Dispersion::High);
    }

    #[test]
    fn test_negative_mean_is_classified_by_cv_magnitude() {
        // Negative counts give a negative mean and so a negative CV
        assert_eq!(Dispersion::classify(-2.5), Dispersion::High);
        assert_eq!(Dispersion::classify(-0.2), Dispersion::Moderate);
        assert_eq!(Dispersion::classify(-0.1), Dispersion::Low);
    }

    #[test]
    fn test_interpret_mentions_outliers_only_when_present() {
        let stats = SummaryStatistics {
            count: 5,
            quantile_method: Default::default(),
            mean: 13.2,
            median: 2.0,
            q1: 2.0,
            q2: 2.0,
            q3: 10.0,
            iqr: 8.0,
            lower_bound: -10.0,
            upper_bound: 22.0,
            min: 2.0,
            max: 50.0,
            range: 48.0,
            variance: 348.16,
            std_dev: 18.66,
            coefficient_of_variation: 1.41,
            relative_distance: 5.6,
            variance_to_mean_squared: 2.0,
        };

        let none = interpret(&stats, &OutlierSets::default());
        assert_eq!(none.skewness, Skewness::Strong);
        assert_eq!(none.dispersion, Dispersion::High);
        assert_eq!(none.remarks.len(), 2);

        let some = interpret(
            &stats,
            &OutlierSets {
                lower: vec![],
                upper: vec![GroupTotal::new("E", 50.0)],
            },
        );
        assert_eq!(some.remarks.len(), 3);
        assert!(some.remarks[2].contains("1 municipality"), "{}", some.remarks[2]);
    }
}
