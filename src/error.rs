//! Domain error types

use thiserror::Error;

/// Errors raised by timer operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The requested countdown duration adds up to zero
    #[error("Please set a valid time!")]
    InvalidDuration,
}

/// Errors from the key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode store: {0}")]
    Json(#[from] serde_json::Error),
}
