//! HSI Frame - Block framing and forward error correction
//!
//! This crate provides the 3-bit CRC block check, the Hamming(7,4)
//! single-error-correcting code and the link layer that combines them.

pub mod crc;
pub mod fec;
pub mod link;
pub mod error;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        crc::{crc_compute, crc_verify, frame_blocks, BLOCK_BITS, CRC_BITS, PAYLOAD_BITS},
        fec::{ErrorStats, FecDecoder, FecEncoder, Hamming74},
        link::{LinkLayer, LinkMode, LinkOutput, ValidationOutcome, LINK_BLOCK_BITS},
        error::{FrameError, Result},
    };
}
