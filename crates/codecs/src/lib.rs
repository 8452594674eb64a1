//! HSI Codecs - Entropy coding for prediction residuals
//!
//! This crate builds minimum-redundancy prefix codes from residual
//! distributions and encodes/decodes residual streams against them.

pub mod huffman;
pub mod error;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        huffman::{CodeTable, DecodeOutcome, FrequencyTable},
        error::{CodecError, Result},
    };
}
