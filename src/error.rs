use crate::search::SearchError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Namesearch
#[derive(Error, Debug)]
pub enum NamesearchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Missing or unusable endpoint/credentials for an external capability.
    /// Raised at startup, never recovered per request.
    #[error("Capability misconfigured: {0}")]
    Configuration(String),

    /// Client request rejected before any external call
    #[error("Invalid request: {errors:?}")]
    Validation { errors: Vec<ValidationError> },

    /// Search index call failed
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// Request was cancelled while awaiting an external call
    #[error("Request cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NamesearchError {
    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, NamesearchError::Validation { .. })
    }
}

/// A single failed rule, for configuration or request validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the key or field that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for Namesearch operations
pub type Result<T> = std::result::Result<T, NamesearchError>;
