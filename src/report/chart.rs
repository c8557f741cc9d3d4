//! Composite on-screen chart.
//!
//! Four framed panels laid out 2×2 and drawn with plain characters:
//!
//! ```text
//! +- Boxplot ---------+ +- Statistics ------+
//! +- Lower outliers --+ +- Upper outliers --+
//! ```
//!
//! The boxplot follows the usual convention: box from Q1 to Q3, median `|`,
//! mean `+`, whiskers to the most extreme totals inside the 1.5×IQR fences,
//! and every total beyond a fence drawn as `o`.

use colored::*;

use super::format_number;
use crate::model::{GroupTotal, SummaryStatistics};
use crate::pipeline::Analysis;

/// Inner width of each panel, in characters.
pub const PANEL_WIDTH: usize = 56;

const GUTTER: &str = "  ";
const MAX_LABEL_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub lines: Vec<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Frame the panel, padding the body to `height` lines.
    pub fn framed(&self, width: usize, height: usize) -> Vec<String> {
        let label = fit(&self.title, width.saturating_sub(2));
        let label = format!(" {} ", label.trim_end());
        let top = format!(
            "+-{}{}-+",
            label,
            "-".repeat(width.saturating_sub(label.chars().count()))
        );
        let bottom = format!("+{}+", "-".repeat(width + 2));

        let mut framed = Vec::with_capacity(height + 2);
        framed.push(top);
        for i in 0..height {
            let line = self.lines.get(i).map(String::as_str).unwrap_or("");
            framed.push(format!("| {} |", fit(line, width)));
        }
        framed.push(bottom);
        framed
    }
}

/// Pad `text` to exactly `width` characters, truncating with `…` if needed.
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{:<width$}", text, width = width)
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

/// Place two framed panels side by side.
fn side_by_side(left: &Panel, right: &Panel, width: usize) -> Vec<String> {
    let height = left.lines.len().max(right.lines.len());
    left.framed(width, height)
        .into_iter()
        .zip(right.framed(width, height))
        .map(|(l, r)| format!("{}{}{}", l, GUTTER, r))
        .collect()
}

// ---------------------------------------------------------------------------
// Boxplot
// ---------------------------------------------------------------------------

/// Column of `value` on a `width`-wide axis spanning `[lo, hi]`.
fn scale(value: f64, lo: f64, hi: f64, width: usize) -> usize {
    if width <= 1 || hi <= lo {
        return width / 2;
    }
    let pos = (value - lo) / (hi - lo) * (width - 1) as f64;
    (pos.round().max(0.0) as usize).min(width - 1)
}

/// Horizontal boxplot of `totals` with an axis line underneath.
pub fn boxplot_lines(totals: &[f64], stats: &SummaryStatistics, width: usize) -> Vec<String> {
    if totals.is_empty() || width < 8 {
        return vec!["(no data)".to_string()];
    }

    let (lo, hi) = (stats.min, stats.max);
    let whisker_low = totals
        .iter()
        .copied()
        .filter(|v| *v >= stats.lower_bound)
        .fold(f64::INFINITY, f64::min);
    let whisker_high = totals
        .iter()
        .copied()
        .filter(|v| *v <= stats.upper_bound)
        .fold(f64::NEG_INFINITY, f64::max);

    let col = |v: f64| scale(v, lo, hi, width);
    let mut row = vec![' '; width];

    if whisker_low.is_finite() && whisker_high.is_finite() {
        let (wl, wh) = (col(whisker_low), col(whisker_high));
        for c in row.iter_mut().take(wh + 1).skip(wl) {
            *c = '-';
        }
        row[wl] = '|';
        row[wh] = '|';
    }

    let (b1, b3) = (col(stats.q1), col(stats.q3));
    for c in row.iter_mut().take(b3 + 1).skip(b1) {
        *c = '=';
    }
    row[b1] = '[';
    row[b3] = ']';
    row[col(stats.median)] = '|';
    row[col(stats.mean)] = '+';

    for v in totals {
        if *v < stats.lower_bound || *v > stats.upper_bound {
            row[col(*v)] = 'o';
        }
    }

    let left = format_number(lo);
    let right = format_number(hi);
    let gap = width.saturating_sub(left.chars().count() + right.chars().count());
    let axis_labels = format!("{}{}{}", left, " ".repeat(gap), right);

    vec![
        String::new(),
        row.into_iter().collect(),
        format!("^{}^", " ".repeat(width - 2)),
        axis_labels,
        String::new(),
        "[==] Q1-Q3  | median  + mean  o outlier".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Statistics panel
// ---------------------------------------------------------------------------

pub fn statistics_lines(stats: &SummaryStatistics) -> Vec<String> {
    let left = [
        format!("Lower bound: {}", format_number(stats.lower_bound)),
        format!("Minimum: {}", format_number(stats.min)),
        format!("Q1: {}", format_number(stats.q1)),
        format!("Median: {}", format_number(stats.median)),
        format!("Q3: {}", format_number(stats.q3)),
        format!("Mean: {:.3}", stats.mean),
        format!("Maximum: {}", format_number(stats.max)),
        format!("Upper bound: {}", format_number(stats.upper_bound)),
    ];
    let right = [
        format!("Mean-median dist.: {:.4}", stats.relative_distance),
        format!("IQR: {}", format_number(stats.iqr)),
        format!("Range: {}", format_number(stats.range)),
        format!("Std deviation: {:.3}", stats.std_dev),
        format!("Coef. variation: {:.4}", stats.coefficient_of_variation),
    ];

    let half = PANEL_WIDTH / 2;
    left.iter()
        .enumerate()
        .map(|(i, l)| {
            let r = right.get(i).map(String::as_str).unwrap_or("");
            format!("{}{}", fit(l, half), r).trim_end().to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outlier bars
// ---------------------------------------------------------------------------

/// Horizontal bars, one per group, scaled to the largest total shown.
pub fn bar_lines(groups: &[GroupTotal], width: usize, empty_message: &str, axis_label: &str) -> Vec<String> {
    if groups.is_empty() {
        return vec![
            String::new(),
            String::new(),
            format!("{:^width$}", empty_message, width = width),
            String::new(),
            String::new(),
        ];
    }

    let label_width = groups
        .iter()
        .map(|g| g.municipality.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH);
    let values: Vec<String> = groups.iter().map(|g| format_number(g.total)).collect();
    let value_width = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let bar_space = width.saturating_sub(label_width + value_width + 2).max(1);
    let max_total = groups.iter().map(|g| g.total).fold(0.0_f64, f64::max);

    let mut lines: Vec<String> = groups
        .iter()
        .zip(&values)
        .map(|(group, value)| {
            let len = if max_total > 0.0 && group.total > 0.0 {
                ((group.total / max_total) * bar_space as f64).round().max(1.0) as usize
            } else {
                0
            };
            format!(
                "{} {} {}",
                fit(&group.municipality, label_width),
                "#".repeat(len),
                value
            )
        })
        .collect();

    lines.push(String::new());
    lines.push(format!("{:>width$}", axis_label, width = width));
    lines
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

/// Render the complete 2×2 figure for an analysis.
pub fn render_chart(analysis: &Analysis, color: bool) -> String {
    let stats = &analysis.statistics;
    let metric = &analysis.metric;

    let mut totals = analysis.series.values();
    totals.sort_by(f64::total_cmp);

    let boxplot = Panel::new("Boxplot", boxplot_lines(&totals, stats, PANEL_WIDTH));
    let summary = Panel::new("Statistics", statistics_lines(stats));
    let lower = Panel::new(
        "Lower outliers",
        bar_lines(&analysis.outliers.lower, PANEL_WIDTH, "No lower outliers", &metric.unit_label),
    );
    let upper = Panel::new(
        "Upper outliers",
        bar_lines(&analysis.outliers.upper, PANEL_WIDTH, "No upper outliers", &metric.unit_label),
    );

    let title = format!("Analysis of {} in Rio de Janeiro municipalities", metric.label.to_lowercase());
    let title = if color { title.bold().to_string() } else { title };

    let mut out = vec![title];
    out.extend(side_by_side(&boxplot, &summary, PANEL_WIDTH));
    out.extend(side_by_side(&lower, &upper, PANEL_WIDTH));
    out.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
