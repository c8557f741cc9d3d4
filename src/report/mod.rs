//! Presentation of a finished analysis.
//!
//! Submodules:
//! - `tables`: the printed text report.
//! - `chart`: the composite on-screen chart (boxplot, statistics panel,
//!   outlier bars).
//!
//! `emit` writes either the text report followed by the chart, or the whole
//! analysis as JSON.

pub mod chart;
pub mod tables;

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::Analysis;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tables followed by the composite chart
    #[default]
    Text,
    /// The full analysis as pretty-printed JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub color: bool,
    pub preview_rows: usize,
}

/// Render the analysis into a single string in the requested format.
pub fn render(analysis: &Analysis, options: &ReportOptions) -> Result<String, ReportError> {
    match options.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
        OutputFormat::Text => {
            let report = tables::render_report(analysis, options.preview_rows, options.color);
            let figure = chart::render_chart(analysis, options.color);
            Ok(format!("{}\n{}", report, figure))
        }
    }
}

/// Render and write to `out`.
pub fn emit<W: Write>(analysis: &Analysis, options: &ReportOptions, out: &mut W) -> Result<(), ReportError> {
    let rendered = render(analysis, options)?;
    writeln!(out, "{}", rendered)?;
    out.flush()?;
    Ok(())
}

/// Counts print without decimals; anything fractional gets three.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(-10.0), "-10");
        assert_eq!(format_number(13.2), "13.200");
        assert_eq!(format_number(0.5), "0.500");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
