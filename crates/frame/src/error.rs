//! Error types for HSI Frame

use thiserror::Error;

/// Frame processing error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid bit value {value} at position {position}")]
    InvalidBit { position: usize, value: u8 },
}

/// Result type for HSI Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;

/// Reject anything that is not a 0/1 bit
pub(crate) fn check_bits(bits: &[u8]) -> Result<()> {
    match bits.iter().position(|&bit| bit > 1) {
        Some(position) => Err(FrameError::InvalidBit {
            position,
            value: bits[position],
        }),
        None => Ok(()),
    }
}
