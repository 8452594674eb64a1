//! Error types for HSI Channel

use thiserror::Error;

/// Channel error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Invalid error rate {rate}: the window size must be non-negative")]
    NegativeErrorRate { rate: i64 },
}

/// Result type for HSI Channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;
