//! Error types for billmark
//!
//! Structured errors are defined with thiserror; anyhow is only used at the
//! binary edge and converts into [`BillmarkError::Other`].

use crate::highlight::remap::RemapError;
use thiserror::Error;

/// Main error type for billmark operations
#[derive(Error, Debug)]
pub enum BillmarkError {
    /// I/O error while reading bills or data files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Units file could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration could not be written back as TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Date that is not a valid `YYYY-MM-DD` calendar date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Parameter tree is malformed
    #[error("Parameter tree error: {0}")]
    ParameterTree(String),

    /// Simplified interval could not be mapped back to the original HTML
    #[error("Coordinate remapping failed: {0}")]
    Remap(#[from] RemapError),

    /// Rename lookup backend failed
    #[error("Rename lookup failed: {0}")]
    RenameLookup(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for billmark operations
pub type Result<T> = std::result::Result<T, BillmarkError>;

/// Convert anyhow::Error to BillmarkError
impl From<anyhow::Error> for BillmarkError {
    fn from(err: anyhow::Error) -> Self {
        BillmarkError::Other(err.to_string())
    }
}
