//! HSI Channel - Bit-error channel models
//!
//! This crate provides the channels that sit between the link-layer encoder
//! and decoder: a seedable windowed injector that flips exactly one bit per
//! window, and a fixed-position channel for deterministic experiments.

pub mod windowed;
pub mod error;

pub use error::{ChannelError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        windowed::{inject_errors, Channel, ChannelStats, FixedFlipChannel, WindowedErrorChannel},
        error::{ChannelError, Result},
    };
}
