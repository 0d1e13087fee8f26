//! Error types for aqua-core

use thiserror::Error;

/// Result type alias using aqua-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for aqua-speed-tools
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Configuration error: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A node in the catalogue failed validation
    #[error("invalid node {id}: {reason}")]
    InvalidNode { id: String, reason: String },

    /// The node catalogue was empty
    #[error("node list cannot be empty")]
    EmptyNodeList,

    /// Platform directory could not be determined
    #[error("Could not determine {what} directory")]
    NoPlatformDir { what: &'static str },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error for a field
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid node error
    pub fn invalid_node(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNode {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
