//! Structured logging for the crime statistics pipeline
//!
//! Provides context-rich logging tagged with the pipeline stage and the
//! metric column being analysed, with timestamps and severity levels.
//! Console output goes to stderr so the report on stdout stays clean;
//! an optional append-only log file receives every entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use crate::pipeline::PipelineError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Aggregate,
    Summarize,
    Report,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "FETCH"),
            Stage::Aggregate => write!(f, "AGG"),
            Stage::Summarize => write!(f, "STATS"),
            Stage::Report => write!(f, "REPORT"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network, decoding or CSV problems while obtaining the dataset
    Acquisition,
    /// Missing data or degenerate statistics
    Computation,
    /// The report could not be written
    Rendering,
    /// Invalid configuration file or environment
    Configuration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Acquisition => write!(f, "ACQUISITION"),
            FailureKind::Computation => write!(f, "COMPUTATION"),
            FailureKind::Rendering => write!(f, "RENDERING"),
            FailureKind::Configuration => write!(f, "CONFIG"),
        }
    }
}

impl FailureKind {
    /// Stage a failure of this kind is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            FailureKind::Acquisition => Stage::Fetch,
            FailureKind::Computation => Stage::Summarize,
            FailureKind::Rendering => Stage::Report,
            FailureKind::Configuration => Stage::System,
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

fn logger_guard() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *logger_guard() = Some(logger);
    }

    fn log(&self, level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(Utc::now(), level, stage, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, subject_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Render one log line: `<timestamp> <LEVEL> <STAGE>[ [subject]]: <message>`.
pub fn format_entry(
    timestamp: DateTime<Utc>,
    level: LogLevel,
    stage: Stage,
    subject: Option<&str>,
    message: &str,
) -> String {
    let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!(
        "{} {} {}{}: {}",
        timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        level,
        stage,
        subject_part,
        message
    )
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

pub fn is_initialized() -> bool {
    logger_guard().is_some()
}

/// Log a general informational message
pub fn info(stage: Stage, subject: Option<&str>, message: &str) {
    if let Some(logger) = logger_guard().as_ref() {
        logger.log(LogLevel::Info, stage, subject, message);
    }
}

/// Log a warning message
pub fn warn(stage: Stage, subject: Option<&str>, message: &str) {
    if let Some(logger) = logger_guard().as_ref() {
        logger.log(LogLevel::Warning, stage, subject, message);
    }
}

/// Log an error message
pub fn error(stage: Stage, subject: Option<&str>, message: &str) {
    if let Some(logger) = logger_guard().as_ref() {
        logger.log(LogLevel::Error, stage, subject, message);
    }
}

/// Log a debug message
pub fn debug(stage: Stage, subject: Option<&str>, message: &str) {
    if let Some(logger) = logger_guard().as_ref() {
        logger.log(LogLevel::Debug, stage, subject, message);
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Map a pipeline failure onto the error taxonomy.
pub fn classify_failure(err: &PipelineError) -> FailureKind {
    match err {
        PipelineError::Acquisition(_) => FailureKind::Acquisition,
        PipelineError::Computation(_) => FailureKind::Computation,
        PipelineError::Rendering(_) => FailureKind::Rendering,
        PipelineError::Config(_) => FailureKind::Configuration,
    }
}

/// Log a fatal pipeline failure once, at error level, with its cause.
pub fn log_stage_failure(err: &PipelineError) {
    let kind = classify_failure(err);
    error(kind.stage(), None, &format!("[{}] {}", kind, err));
}

/// Log the headline numbers of a completed analysis.
pub fn log_run_summary(metric_column: &str, groups: usize, lower: usize, upper: usize) {
    let message = format!(
        "Analysis complete: {} municipalities, {} lower / {} upper outliers",
        groups, lower, upper
    );
    info(Stage::System, Some(metric_column), &message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StatsError;
    use crate::ingest::IngestError;
    use chrono::TimeZone;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let fetch = PipelineError::Acquisition(IngestError::HttpStatus(503));
        assert_eq!(classify_failure(&fetch), FailureKind::Acquisition);
        assert_eq!(classify_failure(&fetch).stage(), Stage::Fetch);

        let stats = PipelineError::Computation(StatsError::NoData);
        assert_eq!(classify_failure(&stats), FailureKind::Computation);
        assert_eq!(classify_failure(&stats).stage(), Stage::Summarize);
    }

    #[test]
    fn test_format_entry_with_and_without_subject() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        assert_eq!(
            format_entry(ts, LogLevel::Info, Stage::Fetch, Some("roubo_veiculo"), "Fetching"),
            "2024-05-01 13:00:00 UTC INFO FETCH [roubo_veiculo]: Fetching"
        );
        assert_eq!(
            format_entry(ts, LogLevel::Error, Stage::System, None, "boom"),
            "2024-05-01 13:00:00 UTC ERROR SYS: boom"
        );
    }

    #[test]
    fn test_append_to_file_accumulates_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("isp_stats.log");
        let path = path.to_str().expect("utf-8 path");

        Logger::append_to_file(path, "first").unwrap();
        Logger::append_to_file(path, "second").unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
