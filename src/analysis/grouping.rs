//! Groups raw records by municipality and sums the metric.

use std::collections::BTreeMap;

use crate::model::{GroupTotal, GroupedSeries, Record};

/// Sum the metric per municipality.
///
/// Missing cells (`None`) contribute nothing, but a municipality whose cells
/// are all missing still appears with a total of zero, the same way a
/// group-by sum skips NaN values without dropping the group.
pub fn group_and_sum(records: &[Record]) -> GroupedSeries {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for record in records {
        let entry = totals.entry(record.municipality.as_str()).or_insert(0.0);
        if let Some(value) = record.value {
            *entry += value;
        }
    }

    GroupedSeries::new(
        totals
            .into_iter()
            .map(|(municipality, total)| GroupTotal::new(municipality, total))
            .collect(),
    )
}

/// Sum of every present metric cell, before grouping.
pub fn raw_total(records: &[Record]) -> f64 {
    records.iter().filter_map(|r| r.value).sum()
}
