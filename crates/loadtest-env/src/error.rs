//! Error types for environment resolution

use thiserror::Error;

/// Result type alias for environment operations
pub type Result<T> = std::result::Result<T, EnvError>;

/// Errors that can occur while resolving the target environment
#[derive(Error, Debug)]
pub enum EnvError {
    /// Environment name is not in the registry
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Custom model name has no route in the active environment
    #[error("Custom model not found: {0}")]
    UnknownCustomModel(String),

    /// Base model name has no route in the active environment
    #[error("Base model not found: {0}")]
    UnknownBaseModel(String),

    /// Application name has no URL in the active environment
    #[error("Application not found: {0}")]
    UnknownApp(String),

    /// Environment file could not be read
    #[error("Failed to read environment file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Environment file could not be parsed
    #[error("Failed to parse environment file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
