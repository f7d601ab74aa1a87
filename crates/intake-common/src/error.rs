//! Error types for Intake

use thiserror::Error;

/// Result type alias for Intake operations
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Main error type for Intake
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<redis::RedisError> for IntakeError {
    fn from(err: redis::RedisError) -> Self {
        IntakeError::Channel(err.to_string())
    }
}
