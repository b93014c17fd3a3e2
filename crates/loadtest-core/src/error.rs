//! Error types for configuration assembly

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while assembling a run configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Test type is not a key in the threshold/profile tables
    #[error("Unknown test type: {0}")]
    UnknownTestType(String),

    /// Duration string could not be parsed
    #[error("Invalid duration '{0}': expected a value like '500ms', '30s', '2m' or '1h'")]
    InvalidDuration(String),
}
