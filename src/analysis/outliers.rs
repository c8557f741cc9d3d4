//! Outlier detection using Tukey's fences (Q1 − 1.5·IQR, Q3 + 1.5·IQR).

use crate::model::{GroupTotal, GroupedSeries, OutlierSets, SummaryStatistics};

/// Split off the groups lying strictly outside the fences.
pub fn find_outliers(series: &GroupedSeries, stats: &SummaryStatistics) -> OutlierSets {
    OutlierSets {
        lower: series.below(stats.lower_bound),
        upper: series.above(stats.upper_bound),
    }
}

/// Groups strictly below Q1, lowest first.
pub fn below_first_quartile(series: &GroupedSeries, stats: &SummaryStatistics) -> Vec<GroupTotal> {
    series.below(stats.q1)
}

/// Groups strictly above Q3, highest first.
pub fn above_third_quartile(series: &GroupedSeries, stats: &SummaryStatistics) -> Vec<GroupTotal> {
    series.above(stats.q3)
}
