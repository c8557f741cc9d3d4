//! Printed text report.
//!
//! Sections, in order: grouped preview, central tendency, position measures,
//! dispersion, groups below Q1 / above Q3, lower and upper outliers, and the
//! closing interpretation. Each section is a heading over a fixed-width rule.

use colored::*;
use tabled::{
    builder::Builder,
    settings::{
        object::{Columns, Rows},
        Alignment, Modify, Style,
    },
};

use super::format_number;
use crate::model::GroupTotal;
use crate::pipeline::Analysis;

pub const RULE_WIDTH: usize = 45;

/// Builds the text report for one analysis.
pub struct TableWriter {
    color_enabled: bool,
}

impl TableWriter {
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Section heading followed by a `-` rule.
    pub fn heading(&self, title: &str) -> String {
        let title = if self.color_enabled {
            title.bold().cyan().to_string()
        } else {
            title.to_string()
        };
        format!("\n{}\n{}", title, "-".repeat(RULE_WIDTH))
    }

    /// Ranked table of municipalities, or `empty_message` if there are none.
    pub fn group_table(&self, groups: &[GroupTotal], value_header: &str, empty_message: &str) -> String {
        if groups.is_empty() {
            return self.notice(empty_message);
        }

        let mut builder = Builder::default();
        builder.push_record(["#".to_string(), "Municipality".to_string(), value_header.to_string()]);
        for (i, group) in groups.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                group.municipality.clone(),
                format_number(group.total),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Columns::single(2)).with(Alignment::right()))
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Aligned `label: value` lines.
    pub fn key_values(&self, pairs: &[(&str, String)]) -> String {
        let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        pairs
            .iter()
            .map(|(k, v)| format!("{:<width$} : {}", k, v, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn notice(&self, message: &str) -> String {
        if self.color_enabled {
            message.yellow().to_string()
        } else {
            message.to_string()
        }
    }
}

/// Render the full text report.
pub fn render_report(analysis: &Analysis, preview_rows: usize, color: bool) -> String {
    let w = TableWriter::new(color);
    let stats = &analysis.statistics;
    let metric = &analysis.metric;
    let mut out = Vec::new();

    out.push(w.heading(&format!(
        "{} by municipality: first {} of {}",
        metric.label,
        analysis.series.head(preview_rows).len(),
        analysis.series.len()
    )));
    out.push(w.group_table(analysis.series.head(preview_rows), &metric.column, "No municipalities."));

    out.push(w.heading("Central tendency"));
    out.push(w.key_values(&[
        ("Mean", format!("{:.3}", stats.mean)),
        ("Median", format_number(stats.median)),
        ("Mean-median distance", format!("{:.4}", stats.relative_distance)),
    ]));

    out.push(w.heading(&format!("Position measures ({} quartiles)", stats.quantile_method)));
    out.push(w.key_values(&[
        ("Lower bound", format_number(stats.lower_bound)),
        ("Minimum", format_number(stats.min)),
        ("Q1", format_number(stats.q1)),
        ("Q2 (median)", format_number(stats.q2)),
        ("Q3", format_number(stats.q3)),
        ("IQR", format_number(stats.iqr)),
        ("Maximum", format_number(stats.max)),
        ("Upper bound", format_number(stats.upper_bound)),
    ]));

    out.push(w.heading("Dispersion"));
    out.push(w.key_values(&[
        ("Range", format_number(stats.range)),
        ("Variance", format!("{:.3}", stats.variance)),
        ("Variance / mean²", format!("{:.4}", stats.variance_to_mean_squared)),
        ("Standard deviation", format!("{:.3}", stats.std_dev)),
        ("Coefficient of variation", format!("{:.4}", stats.coefficient_of_variation)),
    ]));

    out.push(w.heading("Municipalities below Q1 (lowest first)"));
    out.push(w.group_table(&analysis.below_q1, &metric.column, "No municipality is below Q1."));

    out.push(w.heading("Municipalities above Q3 (highest first)"));
    out.push(w.group_table(&analysis.above_q3, &metric.column, "No municipality is above Q3."));

    out.push(w.heading("Lower outliers"));
    out.push(w.group_table(&analysis.outliers.lower, &metric.column, "No lower outliers!"));

    out.push(w.heading("Upper outliers"));
    out.push(w.group_table(&analysis.outliers.upper, &metric.column, "No upper outliers!"));

    out.push(w.heading("Interpretation"));
    out.push(analysis.interpretation.remarks.join("\n"));

    out.join("\n")
}
