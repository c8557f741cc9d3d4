//! Metric registry for the ISP monthly police-district dataset.
//!
//! Defines the incident-count columns this tool knows how to label, along
//! with the wording used in report headings and chart axes. Columns not
//! listed here can still be analysed; they are labelled by their raw name.

use serde::Serialize;

pub use crate::model::{COLUMN_FRAUD, COLUMN_MUNICIPALITY, COLUMN_VEHICLE_THEFT};

// ---------------------------------------------------------------------------
// Metric metadata
// ---------------------------------------------------------------------------

/// Display metadata for a single metric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Column name in the published CSV.
    pub column: String,
    /// Short human-readable name, e.g. "Vehicle theft".
    pub label: String,
    /// Axis label for totals, e.g. "Total vehicle thefts".
    pub unit_label: String,
}

/// Static registry entry. Converted into an owned `Metric` on lookup.
pub struct KnownMetric {
    pub column: &'static str,
    pub label: &'static str,
    pub unit_label: &'static str,
}

/// Incident columns the report wording is tailored for.
pub static METRIC_REGISTRY: &[KnownMetric] = &[
    KnownMetric {
        column: COLUMN_VEHICLE_THEFT,
        label: "Vehicle theft",
        unit_label: "Total vehicle thefts",
    },
    KnownMetric {
        column: COLUMN_FRAUD,
        label: "Fraud",
        unit_label: "Total fraud cases",
    },
];

/// Looks up a registry entry by column name. Returns `None` if not found.
pub fn find_metric(column: &str) -> Option<&'static KnownMetric> {
    METRIC_REGISTRY.iter().find(|m| m.column == column)
}

/// Resolves display metadata for any column, falling back to the raw name.
pub fn describe(column: &str) -> Metric {
    match find_metric(column) {
        Some(known) => Metric {
            column: known.column.to_string(),
            label: known.label.to_string(),
            unit_label: known.unit_label.to_string(),
        },
        None => Metric {
            column: column.to_string(),
            label: column.to_string(),
            unit_label: format!("Total {}", column),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_columns() {
        let mut seen = std::collections::HashSet::new();
        for metric in METRIC_REGISTRY {
            assert!(
                seen.insert(metric.column),
                "duplicate column '{}' found in METRIC_REGISTRY",
                metric.column
            );
        }
    }

    #[test]
    fn test_registry_columns_are_csv_identifiers() {
        // The ISP header uses lowercase snake_case names; anything else
        // would never match a parsed header cell.
        for metric in METRIC_REGISTRY {
            assert!(
                metric
                    .column
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_'),
                "column '{}' is not a lowercase snake_case identifier",
                metric.column
            );
            assert_ne!(metric.column, COLUMN_MUNICIPALITY);
        }
    }

    #[test]
    fn test_describe_known_metric() {
        let metric = describe(COLUMN_FRAUD);
        assert_eq!(metric.label, "Fraud");
        assert_eq!(metric.column, "estelionato");
    }

    #[test]
    fn test_describe_unknown_metric_falls_back_to_column_name() {
        let metric = describe("furto_celular");
        assert_eq!(metric.label, "furto_celular");
        assert_eq!(metric.unit_label, "Total furto_celular");
        assert!(find_metric("furto_celular").is_none());
    }
}
