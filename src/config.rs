//! Run configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional TOML file, and `ISP_STATS_*` environment variables (a `.env`
//! file is loaded into the environment first by `main`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::isp::{ISP_MONTHLY_CISP_URL, TextEncoding};
use crate::logging::LogLevel;
use crate::model::{COLUMN_MUNICIPALITY, COLUMN_VEHICLE_THEFT, QuantileMethod};
use crate::report::OutputFormat;

pub const DEFAULT_CONFIG_PATH: &str = "./isp_stats.toml";
pub const CONFIG_PATH_ENV: &str = "ISP_STATS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a run needs; nothing else is read from the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV resource location
    pub source_url: String,

    pub encoding: TextEncoding,

    /// Grouping column
    pub key_column: String,

    /// Incident-count column to summarize
    pub metric: String,

    pub quantile_method: QuantileMethod,

    pub output_format: OutputFormat,

    /// Enable colored output
    pub color: bool,

    /// Number of grouped rows shown in the preview table
    pub preview_rows: usize,

    /// HTTP timeout; absent means the download may block indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    pub log_level: LogLevel,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: ISP_MONTHLY_CISP_URL.to_string(),
            encoding: TextEncoding::Latin1,
            key_column: COLUMN_MUNICIPALITY.to_string(),
            metric: COLUMN_VEHICLE_THEFT.to_string(),
            quantile_method: QuantileMethod::Linear,
            output_format: OutputFormat::Text,
            color: true,
            preview_rows: 5,
            timeout_secs: None,
            log_level: LogLevel::Info,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Load from the file named by `ISP_STATS_CONFIG` (or the default path),
    /// then apply environment overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file_or_default(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. A missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `ISP_STATS_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ISP_STATS_URL") {
            self.source_url = url;
        }
        if let Some(encoding) = lookup("ISP_STATS_ENCODING") {
            self.encoding = encoding
                .parse()
                .map_err(|message| ConfigError::InvalidValue { key: "ISP_STATS_ENCODING", message })?;
        }
        if let Some(column) = lookup("ISP_STATS_KEY_COLUMN") {
            self.key_column = column;
        }
        if let Some(metric) = lookup("ISP_STATS_METRIC") {
            self.metric = metric;
        }
        if let Some(method) = lookup("ISP_STATS_QUANTILE_METHOD") {
            self.quantile_method = method.parse().map_err(|message| ConfigError::InvalidValue {
                key: "ISP_STATS_QUANTILE_METHOD",
                message,
            })?;
        }
        if let Some(format) = lookup("ISP_STATS_FORMAT") {
            self.output_format = format
                .parse()
                .map_err(|message| ConfigError::InvalidValue { key: "ISP_STATS_FORMAT", message })?;
        }
        if let Some(color) = lookup("ISP_STATS_COLOR") {
            self.color = parse_bool(&color)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "ISP_STATS_COLOR",
                    message: format!("'{}' is not a boolean", color),
                })?;
        }
        if let Some(secs) = lookup("ISP_STATS_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "ISP_STATS_TIMEOUT_SECS",
                message: format!("'{}' is not a whole number of seconds", secs),
            })?;
            self.timeout_secs = Some(secs);
        }
        if let Some(level) = lookup("ISP_STATS_LOG_LEVEL") {
            self.log_level = level
                .parse()
                .map_err(|message| ConfigError::InvalidValue { key: "ISP_STATS_LOG_LEVEL", message })?;
        }
        if let Some(path) = lookup("ISP_STATS_LOG_FILE") {
            self.log_file = Some(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_url.trim().is_empty() {
            return Err(ConfigError::Invalid("source_url must not be empty".into()));
        }
        if self.key_column.trim().is_empty() || self.metric.trim().is_empty() {
            return Err(ConfigError::Invalid("column names must not be empty".into()));
        }
        if self.key_column == self.metric {
            return Err(ConfigError::Invalid(format!(
                "key column and metric are both '{}'",
                self.metric
            )));
        }
        if self.preview_rows == 0 {
            return Err(ConfigError::Invalid("preview_rows must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.metric, "roubo_veiculo");
        assert_eq!(config.key_column, "munic");
        assert_eq!(config.encoding, TextEncoding::Latin1);
        assert!(config.source_url.ends_with("BaseDPEvolucaoMensalCisp.csv"));
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            metric = "estelionato"
            quantile_method = "weibull"
            timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.metric, "estelionato");
        assert_eq!(config.quantile_method, QuantileMethod::Weibull);
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = AppConfig::from_toml_str("quantile_method = \"hazen\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isp_stats.toml");
        std::fs::write(&path, "metric = \"estelionato\"\ncolor = false\n").unwrap();
        let config = AppConfig::from_file_or_default(&path).unwrap();
        assert_eq!(config.metric, "estelionato");
        assert!(!config.color);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("ISP_STATS_METRIC", "estelionato"),
                ("ISP_STATS_ENCODING", "utf-8"),
                ("ISP_STATS_FORMAT", "json"),
                ("ISP_STATS_COLOR", "off"),
                ("ISP_STATS_TIMEOUT_SECS", "30"),
                ("ISP_STATS_LOG_LEVEL", "warn"),
            ]))
            .unwrap();
        assert_eq!(config.metric, "estelionato");
        assert_eq!(config.encoding, TextEncoding::Utf8);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(!config.color);
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.log_level, LogLevel::Warning);
    }

    #[test]
    fn test_bad_env_value_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("ISP_STATS_QUANTILE_METHOD", "hazen")]))
            .unwrap_err();
        assert!(err.to_string().contains("ISP_STATS_QUANTILE_METHOD"), "{}", err);
    }

    #[test]
    fn test_validation_rejects_degenerate_settings() {
        let mut same_columns = AppConfig::default();
        same_columns.metric = "munic".into();
        assert!(same_columns.validate().is_err());

        let mut no_preview = AppConfig::default();
        no_preview.preview_rows = 0;
        assert!(no_preview.validate().is_err());

        let mut blank_metric = AppConfig::default();
        blank_metric.metric = "  ".into();
        assert!(blank_metric.validate().is_err());
    }
}
