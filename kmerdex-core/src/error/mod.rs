//! Core error types for kmerdex

use thiserror::Error;

/// Main error type for kmerdex operations
#[derive(Error, Debug)]
pub enum KmerdexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for kmerdex operations
pub type KmerdexResult<T> = Result<T, KmerdexError>;

impl From<serde_json::Error> for KmerdexError {
    fn from(err: serde_json::Error) -> Self {
        KmerdexError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for KmerdexError {
    fn from(err: anyhow::Error) -> Self {
        KmerdexError::Other(err.to_string())
    }
}

impl KmerdexError {
    /// Process exit code used by the command line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            KmerdexError::Configuration(_) => 2,
            KmerdexError::Io(_) => 3,
            KmerdexError::Parse(_) | KmerdexError::InvalidInput(_) => 4,
            KmerdexError::Network(_) => 5,
            KmerdexError::Routing(_) => 6,
            _ => 1,
        }
    }
}
