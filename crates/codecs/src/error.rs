//! Error types for HSI Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Symbol {symbol} has no codeword in the code table")]
    UnknownSymbol { symbol: i32 },
}

/// Result type for HSI Codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
