//! Error types for the Trackline service.

use thiserror::Error;

/// Main error type for Trackline operations.
#[derive(Error, Debug)]
pub enum TracklineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Statistics store errors
    #[error("Statistics store error: {0}")]
    Store(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Trackline operations.
pub type Result<T> = std::result::Result<T, TracklineError>;
