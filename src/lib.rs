//! Descriptive statistics of Rio de Janeiro crime data by municipality.
//!
//! Downloads the ISP monthly police-district dataset, sums one incident
//! column per municipality, and reports quartiles, dispersion and 1.5×IQR
//! outliers as text tables plus a composite terminal chart.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod report;

pub use config::AppConfig;
pub use pipeline::{Analysis, PipelineError};
