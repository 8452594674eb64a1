//! Synthetic sample cubes

use hsi_core::cube::{element_count, Cube, SampleCube};
use hsi_core::{CoreError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Full-scale value of the gradient cube
pub const GRADIENT_SCALE: f64 = 17736.0;

/// Standard deviation of the gradient noise, before scaling
pub const GRADIENT_NOISE: f64 = 0.1;

/// `(r * cols + c) * bands + b`, 16-bit samples
pub fn linear_ramp(rows: usize, cols: usize, bands: usize) -> Result<SampleCube> {
    element_count(rows, cols, bands)?;
    let samples = Cube::from_fn(rows, cols, bands, |r, c, b| ((r * cols + c) * bands + b) as i32);
    SampleCube::new(samples, 16)
}

/// Every sample equal to `value`, 16-bit samples
pub fn constant(rows: usize, cols: usize, bands: usize, value: i32) -> Result<SampleCube> {
    element_count(rows, cols, bands)?;
    SampleCube::new(Cube::from_fn(rows, cols, bands, |_, _, _| value), 16)
}

/// Spatial gradient plus a per-band sine and Gaussian noise, 32-bit samples
pub fn gradient(rows: usize, cols: usize, bands: usize, seed: Option<u64>) -> Result<SampleCube> {
    element_count(rows, cols, bands)?;
    if rows < 2 || cols < 2 {
        return Err(CoreError::InvalidDimensions {
            msg: format!("spatial dimensions must be at least 2x2, got {}x{}", rows, cols),
        });
    }

    let noise = Normal::new(0.0, GRADIENT_NOISE).map_err(|e| CoreError::InvalidConfiguration {
        msg: format!("noise distribution: {}", e),
    })?;
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let row_step = 1.0 / (rows - 1) as f64;
    let col_step = 1.0 / (cols - 1) as f64;
    let samples = Cube::from_fn(rows, cols, bands, |r, c, b| {
        let base = (r as f64 * row_step) * (c as f64 * col_step);
        let spectral = (2.0 * PI * b as f64 / bands as f64).sin();
        let value = (base + spectral + noise.sample(&mut rng)) * GRADIENT_SCALE;
        value.clamp(0.0, GRADIENT_SCALE).round() as i32
    });

    SampleCube::new(samples, 32)
}
