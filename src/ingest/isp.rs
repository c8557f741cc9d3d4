//! ISP (Instituto de Segurança Pública do Rio de Janeiro) open-data client
//!
//! Retrieves the monthly per-police-district occurrence table published by
//! the ISP and reduces it to (municipality, metric) records.
//!
//! Dataset: https://www.ispdados.rj.gov.br/Arquivos/BaseDPEvolucaoMensalCisp.csv
//! The file is semicolon-delimited and encoded as ISO-8859-1.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::IngestError;
use crate::logging::{self, Stage};
use crate::model::Record;

pub const ISP_MONTHLY_CISP_URL: &str =
    "https://www.ispdados.rj.gov.br/Arquivos/BaseDPEvolucaoMensalCisp.csv";

pub const ISP_DELIMITER: char = ';';

/// Cells the portal uses for "no value"; treated as missing, not as zero.
const MISSING_MARKERS: &[&str] = &["", "NA", "NaN", "nan", "null"];

// ============================================================================
// Text Encoding
// ============================================================================

/// Character encoding of the downloaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[default]
    Latin1,
    Utf8,
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

/// Decode a response body into text.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, IngestError> {
    match encoding {
        TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| IngestError::Decode(format!("invalid UTF-8: {}", e))),
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Build the blocking HTTP client used for the download.
///
/// `None` disables the request timeout entirely; the fetch then blocks
/// until the server answers or the connection drops.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::blocking::Client, IngestError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Download the dataset and decode it to text.
///
/// # Parameters
/// - `client`: HTTP client
/// - `url`: CSV resource location
/// - `encoding`: text encoding of the body
pub fn fetch_dataset(
    client: &reqwest::blocking::Client,
    url: &str,
    encoding: TextEncoding,
) -> Result<String, IngestError> {
    let response = client
        .get(url)
        .header("Accept", "text/csv")
        .send()?;

    if !response.status().is_success() {
        return Err(IngestError::HttpStatus(response.status().as_u16()));
    }

    let body = response.bytes()?;
    decode(&body, encoding)
}

/// Download, decode and parse in one call.
pub fn fetch_records(
    client: &reqwest::blocking::Client,
    url: &str,
    encoding: TextEncoding,
    key_column: &str,
    metric_column: &str,
) -> Result<Vec<Record>, IngestError> {
    let text = fetch_dataset(client, url, encoding)?;
    parse_records(&text, key_column, metric_column)
}

// ============================================================================
// CSV Parsing
// ============================================================================

/// Parse the semicolon-delimited dataset into records.
///
/// The first non-blank line is the header. Rows whose key cell is blank are
/// dropped, mirroring how a group-by ignores missing keys. Metric cells that
/// are blank or carry a missing marker become `None`, as do cells absent
/// from a row shorter than the header.
pub fn parse_records(
    text: &str,
    key_column: &str,
    metric_column: &str,
) -> Result<Vec<Record>, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(IngestError::NoData)?;
    let header = split_fields(header, ISP_DELIMITER).map_err(|message| IngestError::Parse {
        line: header_line,
        message,
    })?;

    let key_idx = column_index(&header, key_column)?;
    let metric_idx = column_index(&header, metric_column)?;
    let needed = key_idx.max(metric_idx) + 1;

    let mut records = Vec::new();
    let mut rows_seen = 0usize;

    for (line_no, line) in lines {
        rows_seen += 1;
        let fields = split_fields(line, ISP_DELIMITER)
            .map_err(|message| IngestError::Parse { line: line_no, message })?;

        if fields.len() < needed {
            logging::warn(
                Stage::Fetch,
                Some(metric_column),
                &format!(
                    "Line {} has {} fields, expected at least {}; absent cells read as missing",
                    line_no,
                    fields.len(),
                    needed
                ),
            );
        }
        let cell = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");

        let municipality = cell(key_idx).trim();
        if municipality.is_empty() {
            continue;
        }

        let value = parse_count(cell(metric_idx)).map_err(|message| IngestError::Parse {
            line: line_no,
            message: format!("column '{}': {}", metric_column, message),
        })?;

        records.push(Record {
            municipality: municipality.to_string(),
            value,
        });
    }

    if rows_seen == 0 {
        return Err(IngestError::NoData);
    }

    Ok(records)
}

fn column_index(header: &[String], column: &str) -> Result<usize, IngestError> {
    header
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| IngestError::MissingColumn(column.to_string()))
}

/// Parse a count cell. Missing markers yield `Ok(None)`.
fn parse_count(cell: &str) -> Result<Option<f64>, String> {
    let cell = cell.trim();
    if MISSING_MARKERS.contains(&cell) {
        return Ok(None);
    }
    let value: f64 = cell
        .parse()
        .map_err(|_| format!("'{}' is not a number", cell))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", cell));
    }
    Ok(Some(value))
}

/// Split one line on `delimiter`, honouring double-quoted fields.
///
/// Inside quotes the delimiter is literal and `""` is an escaped quote.
fn split_fields(line: &str, delimiter: char) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current);
    Ok(fields)
}

// ============================================================================
// Tests
// ============================================================================
