//! Logging System
//!
//! Structured logging through `tracing`. Level, format (text or JSON) and destination
//! (stdout, stderr or an append-mode file) come from the `[logging]` config section,
//! overridden by the `DRUI_LOG*` environment variables and CLI flags. Logs go to
//! stderr by default so command output on stdout stays clean.

use crate::error::DruiError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install a subscriber at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output is "file"; defaults to the user data directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Colored output (text format on a terminal only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
}

/// `<data dir>/drui/drui.log`
pub fn default_log_file() -> PathBuf {
    ProjectDirs::from("", "", "drui")
        .map(|dirs| dirs.data_dir().join("drui.log"))
        .unwrap_or_else(|| PathBuf::from("drui.log"))
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. CLI arguments (folded into the config by the binary)
/// 2. Environment variables (DRUI_LOG, DRUI_LOG_FORMAT, DRUI_LOG_OUTPUT, DRUI_LOG_MODULES)
/// 3. Configuration file
/// 4. Defaults
pub fn init_logging(config: &LoggingConfig) -> Result<(), DruiError> {
    if !config.enabled {
        return Ok(());
    }

    let env = |key: &str| std::env::var(key).ok();
    let filter = build_env_filter(config, env)?;
    let format = determine_format(config, env)?;
    let output = determine_output(config, env)?;

    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            let log_file = config.file.clone().unwrap_or_else(default_log_file);
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DruiError::Config(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .map_err(|e| {
                    DruiError::Config(format!("Failed to open log file {:?}: {}", log_file, e))
                })?;
            BoxMakeWriter::new(Arc::new(file))
        }
    };
    let use_color = config.color && output != LogOutput::File;

    let base_subscriber = Registry::default().with(filter);
    let result = match format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init(),
    };

    result.map_err(|e| DruiError::Config(format!("Failed to install logger: {}", e)))
}

/// Build environment filter from config or environment variables
fn build_env_filter<F>(config: &LoggingConfig, env: F) -> Result<EnvFilter, DruiError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(directives) = env("DRUI_LOG") {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return Ok(filter);
        }
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| DruiError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| DruiError::Config(format!("Invalid log directive: {}", e)))?,
        );
    }

    if let Some(modules_str) = env("DRUI_LOG_MODULES") {
        for module_spec in modules_str.split(',') {
            if let Some((module, level)) = module_spec.split_once('=') {
                let directive = format!("{}={}", module.trim(), level.trim());
                filter = filter.add_directive(directive.parse().map_err(|e| {
                    DruiError::Config(format!("Invalid log directive from env: {}", e))
                })?);
            }
        }
    }

    Ok(filter)
}

fn determine_format<F>(config: &LoggingConfig, env: F) -> Result<LogFormat, DruiError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(format) = env("DRUI_LOG_FORMAT") {
        if let Ok(format) = parse_format(&format) {
            return Ok(format);
        }
    }
    parse_format(&config.format)
}

fn parse_format(format: &str) -> Result<LogFormat, DruiError> {
    match format {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err(DruiError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        ))),
    }
}

fn determine_output<F>(config: &LoggingConfig, env: F) -> Result<LogOutput, DruiError>
where
    F: Fn(&str) -> Option<String>,
{
    match env("DRUI_LOG_OUTPUT") {
        Some(output) => parse_output(&output),
        None => parse_output(&config.output),
    }
}

fn parse_output(output: &str) -> Result<LogOutput, DruiError> {
    match output {
        "stdout" => Ok(LogOutput::Stdout),
        "stderr" => Ok(LogOutput::Stderr),
        "file" => Ok(LogOutput::File),
        _ => Err(DruiError::Config(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            output
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "text");
        assert_eq!(config.output, "stderr");
        assert!(config.file.is_none());
        assert!(config.color);
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output("stdout").unwrap(), LogOutput::Stdout);
        assert_eq!(parse_output("stderr").unwrap(), LogOutput::Stderr);
        assert_eq!(parse_output("file").unwrap(), LogOutput::File);
        assert!(parse_output("both").is_err());
    }

    #[test]
    fn test_env_format_overrides_config() {
        let config = LoggingConfig::default();
        let env = |key: &str| (key == "DRUI_LOG_FORMAT").then(|| "json".to_string());
        assert_eq!(determine_format(&config, env).unwrap(), LogFormat::Json);
        assert_eq!(determine_format(&config, no_env).unwrap(), LogFormat::Text);
    }

    #[test]
    fn test_invalid_config_format_rejected() {
        let config = LoggingConfig {
            format: "xml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(determine_format(&config, no_env), Err(DruiError::Config(_))));
    }

    #[test]
    fn test_env_output_overrides_config() {
        let config = LoggingConfig::default();
        let env = |key: &str| (key == "DRUI_LOG_OUTPUT").then(|| "stdout".to_string());
        assert_eq!(determine_output(&config, env).unwrap(), LogOutput::Stdout);
    }

    #[test]
    fn test_module_directives_accepted() {
        let mut config = LoggingConfig::default();
        config.modules.insert("drui::queue".to_string(), "debug".to_string());
        let env = |key: &str| (key == "DRUI_LOG_MODULES").then(|| "drui::modal=trace".to_string());
        assert!(build_env_filter(&config, env).is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "drui=verbose".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config, no_env).is_err());
    }
}
