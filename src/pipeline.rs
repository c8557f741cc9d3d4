//! Fetch → group → summarize pipeline.
//!
//! Every entry point returns `Result<Analysis, PipelineError>`; deciding how
//! to report a failure and whether to exit is left to the caller. Rendering is
//! a separate step (`report::emit`) so the analysis can be inspected or
//! serialized on its own.

use serde::Serialize;
use thiserror::Error;

use crate::analysis::grouping::group_and_sum;
use crate::analysis::interpretation::{Interpretation, interpret};
use crate::analysis::outliers::{above_third_quartile, below_first_quartile, find_outliers};
use crate::analysis::summary::summarize;
use crate::analysis::StatsError;
use crate::config::{AppConfig, ConfigError};
use crate::ingest::isp;
use crate::ingest::IngestError;
use crate::logging::{self, Stage};
use crate::metrics::{self, Metric};
use crate::model::{GroupTotal, GroupedSeries, OutlierSets, QuantileMethod, Record, SummaryStatistics};
use crate::report::ReportError;

/// Failure of any stage, tagged by the error taxonomy.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error obtaining data: {0}")]
    Acquisition(#[from] IngestError),

    #[error("Error computing statistics: {0}")]
    Computation(#[from] StatsError),

    #[error("Error rendering report: {0}")]
    Rendering(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Everything the reporter needs, computed once per run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub metric: Metric,
    pub series: GroupedSeries,
    pub statistics: SummaryStatistics,
    pub outliers: OutlierSets,
    /// Groups strictly below Q1, lowest first
    pub below_q1: Vec<GroupTotal>,
    /// Groups strictly above Q3, highest first
    pub above_q3: Vec<GroupTotal>,
    pub interpretation: Interpretation,
}

/// Summarize an already-grouped series.
pub fn analyze_series(
    series: GroupedSeries,
    metric: Metric,
    method: QuantileMethod,
) -> Result<Analysis, PipelineError> {
    let statistics = summarize(&series, method)?;
    logging::debug(
        Stage::Summarize,
        Some(&metric.column),
        &format!(
            "q1={} q2={} q3={} iqr={} mean={:.3}",
            statistics.q1, statistics.q2, statistics.q3, statistics.iqr, statistics.mean
        ),
    );

    let outliers = find_outliers(&series, &statistics);
    let below_q1 = below_first_quartile(&series, &statistics);
    let above_q3 = above_third_quartile(&series, &statistics);
    let interpretation = interpret(&statistics, &outliers);

    Ok(Analysis {
        metric,
        series,
        statistics,
        outliers,
        below_q1,
        above_q3,
        interpretation,
    })
}

/// Group raw records and summarize them.
pub fn analyze_records(
    records: &[Record],
    metric: Metric,
    method: QuantileMethod,
) -> Result<Analysis, PipelineError> {
    let missing = records.iter().filter(|r| r.value.is_none()).count();
    if missing > 0 {
        logging::warn(
            Stage::Aggregate,
            Some(&metric.column),
            &format!("{} rows with a missing value were skipped", missing),
        );
    }

    let series = group_and_sum(records);
    logging::info(
        Stage::Aggregate,
        Some(&metric.column),
        &format!("Grouped {} rows into {} municipalities", records.len(), series.len()),
    );
    if series.is_empty() {
        return Err(StatsError::NoData.into());
    }
    analyze_series(series, metric, method)
}

/// Parse downloaded CSV text and run the remaining stages.
pub fn analyze_text(text: &str, config: &AppConfig) -> Result<Analysis, PipelineError> {
    let records = isp::parse_records(text, &config.key_column, &config.metric)?;
    analyze_records(&records, metrics::describe(&config.metric), config.quantile_method)
}

/// Size of a downloaded body, counted in bytes without scanning the text.
fn download_summary(text: &str) -> String {
    format!("Downloaded {} bytes", text.len())
}

/// Run the whole pipeline against the configured source.
pub fn run(config: &AppConfig) -> Result<Analysis, PipelineError> {
    logging::info(
        Stage::Fetch,
        Some(&config.metric),
        &format!("Fetching data from {}", config.source_url),
    );
    let client = isp::build_client(config.timeout())?;
    let text = isp::fetch_dataset(&client, &config.source_url, config.encoding)?;
    logging::debug(
        Stage::Fetch,
        Some(&config.metric),
        &download_summary(&text),
    );

    let analysis = analyze_text(&text, config)?;
    logging::log_run_summary(
        &config.metric,
        analysis.series.len(),
        analysis.outliers.lower.len(),
        analysis.outliers.upper.len(),
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(metric: &str) -> AppConfig {
        AppConfig {
            metric: metric.to_string(),
            ..AppConfig::default()
        }
    }

    const CSV: &str = "\
munic;roubo_veiculo;estelionato
A;1;5
A;1;3
B;10;1
C;2;1
D;2;1
E;50;1
";

    #[test]
    fn test_analyze_text_groups_before_summarizing() {
        let analysis = analyze_text(CSV, &config_for("roubo_veiculo")).unwrap();
        assert_eq!(analysis.series.len(), 5);
        assert_eq!(analysis.series.find("A").map(|g| g.total), Some(2.0));
        assert_eq!(analysis.statistics.q1, 2.0);
        assert_eq!(analysis.statistics.q3, 10.0);
        assert_eq!(analysis.outliers.upper, vec![GroupTotal::new("E", 50.0)]);
        assert!(analysis.outliers.lower.is_empty());
        assert_eq!(analysis.metric.label, "Vehicle theft");
    }

    #[test]
    fn test_metric_is_configuration() {
        let analysis = analyze_text(CSV, &config_for("estelionato")).unwrap();
        assert_eq!(analysis.series.find("A").map(|g| g.total), Some(8.0));
        assert_eq!(analysis.metric.label, "Fraud");
    }

    #[test]
    fn test_missing_column_is_an_acquisition_failure() {
        let err = analyze_text(CSV, &config_for("furto_celular")).unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(IngestError::MissingColumn(_))));
        assert!(err.to_string().starts_with("Error obtaining data"));
    }

    #[test]
    fn test_all_zero_metric_is_a_computation_failure() {
        let csv = "munic;roubo_veiculo\nA;0\nB;0\n";
        let err = analyze_text(csv, &config_for("roubo_veiculo")).unwrap_err();
        assert!(matches!(err, PipelineError::Computation(StatsError::Undefined { .. })));
    }

    #[test]
    fn test_download_summary_counts_bytes() {
        // 'ó' is two bytes once decoded into a String
        assert_eq!(download_summary("Niterói"), "Downloaded 8 bytes");
    }

    #[test]
    fn test_rows_without_keys_leave_no_data() {
        let csv = "munic;roubo_veiculo\n;3\n;4\n";
        let err = analyze_text(csv, &config_for("roubo_veiculo")).unwrap_err();
        assert!(matches!(err, PipelineError::Computation(StatsError::NoData)));
    }
}
