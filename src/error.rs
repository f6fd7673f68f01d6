use std::io;
use thiserror::Error;

/// Custom error type for the caretaker library
#[derive(Error, Debug)]
pub enum CaretakerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the caretaker library
pub type Result<T> = std::result::Result<T, CaretakerError>;

impl CaretakerError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CaretakerError::Config(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        CaretakerError::InvalidPath(msg.into())
    }

    pub fn schedule<S: Into<String>>(msg: S) -> Self {
        CaretakerError::Schedule(msg.into())
    }

    pub fn mail<S: Into<String>>(msg: S) -> Self {
        CaretakerError::Mail(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CaretakerError::Other(msg.into())
    }
}
