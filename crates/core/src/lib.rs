//! HSI Core - Sample cubes, predictors and residuals
//!
//! This crate provides the in-memory hyperspectral cube container, the
//! spatial/spectral predictor strategies and the residual formation used by
//! the source coder.

pub mod cube;
pub mod predictor;
pub mod residual;
pub mod error;

pub use error::{CoreError, Result};

/// Number of leading bands that take part in compression.
pub const ACTIVE_BANDS: usize = 5;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        cube::{Cube, SampleCube, PredictorArray, ReconstructedCube},
        predictor::{predict, PredictorStrategy},
        residual::{form_residuals, reconstruct, reconcile_length, ResidualStream, SizeMismatch},
        error::{CoreError, Result},
        ACTIVE_BANDS,
    };
}
