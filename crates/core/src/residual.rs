//! Residual formation and cube reconstruction

use crate::cube::{element_count, Cube, PredictorArray, ReconstructedCube, SampleCube};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Flattened residuals in row-major, band-minor order
pub type ResidualStream = Vec<i32>;

/// Difference between the number of decoded residuals and the number the
/// reconstruction needs. Reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// `sample - predictor` over the active bands, truncated toward zero
pub fn form_residuals(cube: &SampleCube, predictor: &PredictorArray) -> Result<ResidualStream> {
    let (rows, cols, _) = cube.shape();
    let bands = cube.active_bands();
    if predictor.shape() != (rows, cols, bands) {
        return Err(CoreError::SizeMismatch {
            expected: element_count(rows, cols, bands)?,
            actual: predictor.len(),
        });
    }

    let samples = cube.samples();
    let mut residuals = Vec::with_capacity(predictor.len());
    for r in 0..rows {
        for c in 0..cols {
            for b in 0..bands {
                let difference = samples[(r, c, b)] as f64 - predictor[(r, c, b)];
                residuals.push(difference.trunc() as i32);
            }
        }
    }

    Ok(residuals)
}

/// Zero-pad or truncate `decoded` to `expected` entries
pub fn reconcile_length(mut decoded: Vec<i32>, expected: usize) -> (Vec<i32>, Option<SizeMismatch>) {
    let actual = decoded.len();
    if actual == expected {
        return (decoded, None);
    }

    tracing::warn!("Decoded {} residuals, expected {}; reshaping", actual, expected);
    decoded.resize(expected, 0);
    (decoded, Some(SizeMismatch { expected, actual }))
}

/// Rebuild the active sub-cube as `predictor + residual`
pub fn reconstruct(predictor: &PredictorArray, residuals: &[i32]) -> Result<ReconstructedCube> {
    if residuals.len() != predictor.len() {
        return Err(CoreError::SizeMismatch {
            expected: predictor.len(),
            actual: residuals.len(),
        });
    }

    let (rows, cols, bands) = predictor.shape();
    let data = predictor
        .data()
        .iter()
        .zip(residuals)
        .map(|(&p, &d)| p + d as f64)
        .collect();

    Cube::from_data(rows, cols, bands, data)
}
