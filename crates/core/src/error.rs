//! Error types for HSI Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid cube dimensions: {msg}")]
    InvalidDimensions { msg: String },

    #[error("Cube size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {msg}")]
    InvalidConfiguration { msg: String },
}

/// Result type for HSI Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
