//! Live tests against the ISP open-data portal
//!
//! These depend on external availability and are marked #[ignore] so they
//! don't run during normal builds.
//!
//! Run with: cargo test --test isp_live -- --ignored

use isp_crime_stats::ingest::isp::{self, ISP_MONTHLY_CISP_URL, TextEncoding};
use isp_crime_stats::model::{COLUMN_FRAUD, COLUMN_MUNICIPALITY, COLUMN_VEHICLE_THEFT};
use isp_crime_stats::{pipeline, AppConfig};

#[test]
#[ignore] // Don't run in CI - depends on external API
fn live_dataset_has_expected_columns() {
    let client = isp::build_client(Some(std::time::Duration::from_secs(120))).unwrap();
    let text = isp::fetch_dataset(&client, ISP_MONTHLY_CISP_URL, TextEncoding::Latin1)
        .expect("ISP dataset should be reachable");

    for metric in [COLUMN_VEHICLE_THEFT, COLUMN_FRAUD] {
        let records = isp::parse_records(&text, COLUMN_MUNICIPALITY, metric)
            .unwrap_or_else(|e| panic!("column '{}' should parse: {}", metric, e));
        println!("{}: {} rows", metric, records.len());
        assert!(!records.is_empty());
    }
}

#[test]
#[ignore] // Don't run in CI - depends on external API
fn live_pipeline_produces_consistent_statistics() {
    let config = AppConfig {
        timeout_secs: Some(120),
        ..AppConfig::default()
    };
    let analysis = pipeline::run(&config).expect("live pipeline should succeed");
    let stats = &analysis.statistics;

    println!(
        "\n{} municipalities, q1={} median={} q3={} upper outliers={}",
        analysis.series.len(),
        stats.q1,
        stats.median,
        stats.q3,
        analysis.outliers.upper.len()
    );

    // Rio de Janeiro has 92 municipalities
    assert!(analysis.series.len() >= 90, "got {}", analysis.series.len());
    assert!(stats.q1 <= stats.q2 && stats.q2 <= stats.q3);
    assert!(
        analysis.outliers.upper.iter().any(|g| g.municipality == "Rio de Janeiro"),
        "the capital should be an upper outlier for vehicle theft"
    );
}
