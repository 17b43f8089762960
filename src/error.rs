//! Error types for the lacak CLI

use thiserror::Error;

/// Result type alias for lacak operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot determine lookup type for '{0}': not a phone number or NIK")]
    UnrecognizedTarget(String),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Remote API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API authentication failed. Check your API key with `lacak init`.")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `lacak init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local store errors.
///
/// These never escape the store's public query methods (storage faults are
/// downgraded to absence), but `db` subcommands report them directly.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Local database is disabled in configuration")]
    Disabled,

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database I/O error: {0}")]
    Io(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Other(err.to_string())
    }
}
