//! Optional `fpart.toml` tool configuration.
//!
//! Everything has a default, so the file is only needed to change reporting
//! or enable strict mode. Unknown sections are rejected rather than ignored.

use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

/// Errors that can occur when loading a `fpart.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for the run summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Settings for the end-of-run report.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Whether to print the stage timing table.
    #[serde(default = "default_true")]
    pub timing: bool,
    /// Summary output format.
    #[serde(default)]
    pub format: SummaryFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timing: true,
            format: SummaryFormat::Text,
        }
    }
}

/// Settings for the partitioning run itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionConfig {
    /// Exit nonzero when any node needed the fallback pass.
    #[serde(default)]
    pub strict: bool,
}

/// The full tool configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// End-of-run report settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Partitioning run settings.
    #[serde(default)]
    pub partition: PartitionConfig,
}

fn default_true() -> bool {
    true
}

/// Loads a `fpart.toml` configuration from a file.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses a `fpart.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ToolConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ToolConfig::default();
        assert!(config.report.timing);
        assert_eq!(config.report.format, SummaryFormat::Text);
        assert!(!config.partition.strict);
    }

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert!(config.report.timing);
        assert!(!config.partition.strict);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[report]
timing = false
format = "json"

[partition]
strict = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(!config.report.timing);
        assert_eq!(config.report.format, SummaryFormat::Json);
        assert!(config.partition.strict);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[partition]\nstrict = true\n").unwrap();
        assert!(config.report.timing);
        assert!(config.partition.strict);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = load_config_from_str("[report]\ncolor = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_format_is_rejected() {
        let err = load_config_from_str("[report]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/fpart.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
