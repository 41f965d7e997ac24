//! Error types for the DRUI registry front-end.

use thiserror::Error;

/// Task queue construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Concurrency limit must be > 0, got {0}")]
    InvalidConcurrency(usize),
}

/// Registry HTTP API errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Auth provider \"{0}\" not supported.")]
    UnsupportedAuth(String),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
}

impl RegistryError {
    /// HTTP status code reported back through the transport for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::NotFound(_) => 404,
            RegistryError::Unauthorized(_) | RegistryError::UnsupportedAuth(_) => 401,
            RegistryError::RequestFailed { status, .. } => *status,
            RegistryError::Connection(_) => 503,
            RegistryError::InvalidResponse(_) => 500,
        }
    }
}

/// Key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is corrupt: {0}")]
    Corrupt(String),

    #[error("Store serialization failed: {0}")]
    Serialize(String),
}

/// Top-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum DruiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Task queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to get user input: {0}")]
    Input(String),

    #[error("Tag deletion is disabled by configuration")]
    DeleteDisabled,

    #[error("{failed} of {total} tag deletions failed:\n{details}")]
    BatchFailed {
        failed: usize,
        total: usize,
        details: String,
    },
}

impl From<config::ConfigError> for DruiError {
    fn from(err: config::ConfigError) -> Self {
        DruiError::Config(err.to_string())
    }
}
