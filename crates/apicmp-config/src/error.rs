//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors detected before a run starts
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the row file
    #[error("failed to parse CSV in {path}: {source}")]
    ParseCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to parse a plugin file
    #[error("failed to parse plugin {path}: {source}")]
    ParsePlugin {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Header that is malformed or cannot be sent over HTTP
    #[error("invalid header '{header}': {reason}")]
    InvalidHeader { header: String, reason: String },

    /// Ignore pattern that cannot be compiled
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
