//! Error types for Qarar

use thiserror::Error;

/// Core error type for Qarar operations
#[derive(Error, Debug)]
pub enum QararError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Qarar operations
pub type Result<T> = std::result::Result<T, QararError>;
