//! Data acquisition for the crime statistics pipeline.
//!
//! Submodules:
//! - `isp`: fetches and parses the ISP (Instituto de Segurança Pública)
//!   monthly police-district CSV.

pub mod isp;

use thiserror::Error;

/// Errors that can arise when fetching or parsing the source dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx HTTP response from the data portal.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// The response body is not valid in the configured text encoding.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A required column is absent from the CSV header.
    #[error("Missing column: '{0}'")]
    MissingColumn(String),
    /// A data row could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// The file had a header but no data rows.
    #[error("No data rows in dataset")]
    NoData,
}
