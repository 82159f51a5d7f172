use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid since value '{value}', expected YYYY-MM-DD: {source}")]
    InvalidSince {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Failed to read config file at {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from config file at {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Listing object versions failed: {0}")]
    Listing(String),

    #[error("AWS SDK S3 error: {0}")]
    S3Sdk(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Wraps any AWS SDK error, keeping the full error chain in the message.
    pub fn s3<E>(err: E) -> Self
    where
        E: std::error::Error,
    {
        AppError::S3Sdk(aws_sdk_s3::error::DisplayErrorContext(err).to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
