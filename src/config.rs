//! Configuration System
//!
//! Layered configuration: built-in defaults, the user-level file, workspace files and
//! `DRUI_*` environment variables, in increasing precedence. See [`ConfigLoader`].

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DruiConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub broadcast: BroadcastConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Registry connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry API endpoint, e.g. `https://registry.example.com`
    #[serde(default)]
    pub endpoint: String,

    /// Endpoint shown in `docker pull` lines (defaults to `endpoint`)
    #[serde(default)]
    pub pull_endpoint: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            pull_endpoint: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RegistryConfig {
    pub fn pull_endpoint(&self) -> &str {
        self.pull_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or(&self.endpoint)
    }
}

/// Front-end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_images_per_page")]
    pub images_per_page: usize,

    /// Name prefixes marked as official images
    #[serde(default)]
    pub official_prefix: Vec<String>,

    /// Name prefixes marked as verified publishers
    #[serde(default)]
    pub verified_prefix: Vec<String>,

    /// Concurrent DELETE requests during batch deletion
    #[serde(default = "default_delete_concurrency")]
    pub delete_concurrency: usize,

    #[serde(default)]
    pub disable_delete: bool,
}

fn default_images_per_page() -> usize {
    50
}

fn default_delete_concurrency() -> usize {
    crate::flow::DEFAULT_DELETE_CONCURRENCY
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            images_per_page: default_images_per_page(),
            official_prefix: Vec::new(),
            verified_prefix: Vec::new(),
            delete_concurrency: default_delete_concurrency(),
            disable_delete: false,
        }
    }
}

/// Broadcast message source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Registry(String),
    Ui(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Registry(msg) => write!(f, "Registry: {}", msg),
            ValidationError::Ui(msg) => write!(f, "UI: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_http_url(value: &str) -> bool {
    match reqwest::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

impl DruiConfig {
    /// Validate the whole configuration, collecting every problem.
    ///
    /// `require_endpoint` is set by commands that talk to the registry.
    pub fn validate(&self, require_endpoint: bool) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.registry.endpoint.is_empty() {
            if require_endpoint {
                errors.push(ValidationError::Registry(
                    "Registry endpoint not set. Check configuration file.".to_string(),
                ));
            }
        } else if !is_http_url(&self.registry.endpoint) {
            errors.push(ValidationError::Registry(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.registry.endpoint
            )));
        }

        if let Some(pull_endpoint) = &self.registry.pull_endpoint {
            if pull_endpoint.trim().is_empty() {
                errors.push(ValidationError::Registry(
                    "pull_endpoint cannot be blank".to_string(),
                ));
            }
        }

        if self.registry.timeout_secs == 0 {
            errors.push(ValidationError::Registry(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.ui.delete_concurrency == 0 {
            errors.push(ValidationError::Ui(
                "delete_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.ui.images_per_page == 0 {
            errors.push(ValidationError::Ui(
                "images_per_page must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "Invalid format '{}'",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
