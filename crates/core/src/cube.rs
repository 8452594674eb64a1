//! Three-dimensional sample cube storage

use crate::{CoreError, Result, ACTIVE_BANDS};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// `rows * cols * bands`, or `InvalidDimensions` when it overflows `usize`
pub fn element_count(rows: usize, cols: usize, bands: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(bands))
        .ok_or_else(|| CoreError::InvalidDimensions {
            msg: format!("{}x{}x{} elements do not fit in memory", rows, cols, bands),
        })
}

/// Dense rows × cols × bands array stored row-major, band-minor.
///
/// Element `(r, c, b)` lives at `(r * cols + c) * bands + b`, which is the
/// traversal order shared by residual formation and reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube<T> {
    rows: usize,
    cols: usize,
    bands: usize,
    data: Vec<T>,
}

impl<T> Cube<T>
where
    T: Clone + Default,
{
    /// Create a cube filled with `T::default()`
    pub fn new(rows: usize, cols: usize, bands: usize) -> Result<Self> {
        let len = element_count(rows, cols, bands)?;
        Ok(Self {
            rows,
            cols,
            bands,
            data: vec![T::default(); len],
        })
    }

    /// Create a cube from existing data in row-major, band-minor order
    pub fn from_data(rows: usize, cols: usize, bands: usize, data: Vec<T>) -> Result<Self> {
        let expected = element_count(rows, cols, bands)?;
        if data.len() != expected {
            return Err(CoreError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { rows, cols, bands, data })
    }

    /// Build a cube by evaluating `f(r, c, b)` for every element.
    ///
    /// The dimensions are trusted; use [`element_count`] first when they come
    /// from outside.
    pub fn from_fn<F>(rows: usize, cols: usize, bands: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols * bands);
        for r in 0..rows {
            for c in 0..cols {
                for b in 0..bands {
                    data.push(f(r, c, b));
                }
            }
        }
        Self { rows, cols, bands, data }
    }

    /// Convert every element, keeping the shape
    pub fn map<U, F>(&self, f: F) -> Cube<U>
    where
        F: FnMut(&T) -> U,
    {
        Cube {
            rows: self.rows,
            cols: self.cols,
            bands: self.bands,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Copy the sub-cube made of bands `[0, bands)`
    pub fn leading_bands(&self, bands: usize) -> Cube<T> {
        let bands = bands.min(self.bands);
        Cube::from_fn(self.rows, self.cols, bands, |r, c, b| self[(r, c, b)].clone())
    }
}

impl<T> Cube<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Shape as `(rows, cols, bands)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.bands)
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of `(r, c, b)`
    #[inline]
    pub fn offset(&self, r: usize, c: usize, b: usize) -> usize {
        (r * self.cols + c) * self.bands + b
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<(usize, usize, usize)> for Cube<T> {
    type Output = T;

    fn index(&self, (r, c, b): (usize, usize, usize)) -> &Self::Output {
        &self.data[self.offset(r, c, b)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Cube<T> {
    fn index_mut(&mut self, (r, c, b): (usize, usize, usize)) -> &mut Self::Output {
        let offset = self.offset(r, c, b);
        &mut self.data[offset]
    }
}

/// Real-valued per-pixel predictions over the active bands
pub type PredictorArray = Cube<f64>;

/// Predictor plus decoded residuals, over the active bands
pub type ReconstructedCube = Cube<f64>;

/// Integer hyperspectral cube together with its per-sample bit depth
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCube {
    samples: Cube<i32>,
    bit_depth: u32,
}

impl SampleCube {
    /// Wrap samples, rejecting cubes the predictors cannot handle
    pub fn new(samples: Cube<i32>, bit_depth: u32) -> Result<Self> {
        let (rows, cols, bands) = samples.shape();
        if rows < 2 || cols < 2 {
            return Err(CoreError::InvalidDimensions {
                msg: format!("spatial dimensions must be at least 2x2, got {}x{}", rows, cols),
            });
        }

        if bands == 0 {
            return Err(CoreError::InvalidDimensions {
                msg: "cube has no bands".to_string(),
            });
        }

        if bit_depth == 0 {
            return Err(CoreError::InvalidDimensions {
                msg: "bit depth must be greater than 0".to_string(),
            });
        }

        Ok(Self { samples, bit_depth })
    }

    /// Build from flat row-major, band-minor data
    pub fn from_data(
        rows: usize,
        cols: usize,
        bands: usize,
        data: Vec<i32>,
        bit_depth: u32,
    ) -> Result<Self> {
        Self::new(Cube::from_data(rows, cols, bands, data)?, bit_depth)
    }

    pub fn samples(&self) -> &Cube<i32> {
        &self.samples
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.samples.shape()
    }

    /// Number of bands that are compressed: `min(bands, ACTIVE_BANDS)`
    pub fn active_bands(&self) -> usize {
        self.samples.bands().min(ACTIVE_BANDS)
    }

    /// Number of samples in the active sub-cube
    pub fn active_len(&self) -> usize {
        self.samples.rows() * self.samples.cols() * self.active_bands()
    }

    /// Copy of the active sub-cube
    pub fn active(&self) -> Cube<i32> {
        self.samples.leading_bands(ACTIVE_BANDS)
    }

    /// Element-wise equality of `reconstructed` against the active sub-cube
    pub fn matches(&self, reconstructed: &ReconstructedCube) -> bool {
        let (rows, cols, _) = self.shape();
        if reconstructed.shape() != (rows, cols, self.active_bands()) {
            return false;
        }

        (0..rows).all(|r| {
            (0..cols).all(|c| {
                (0..self.active_bands())
                    .all(|b| reconstructed[(r, c, b)] == self.samples[(r, c, b)] as f64)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_layout_is_band_minor() {
        let cube = Cube::from_fn(2, 3, 4, |r, c, b| (r * 100 + c * 10 + b) as i32);
        assert_eq!(cube.len(), 24);
        assert_eq!(cube.data()[0..4], [0, 1, 2, 3]);
        assert_eq!(cube.data()[4], 10);
        assert_eq!(cube[(1, 2, 3)], 123);
        assert_eq!(cube.offset(1, 0, 0), 12);
    }

    #[test]
    fn test_from_data_size_mismatch() {
        let result = Cube::from_data(2, 2, 2, vec![0i32; 7]);
        assert_eq!(
            result.unwrap_err(),
            CoreError::SizeMismatch { expected: 8, actual: 7 }
        );
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        assert!(matches!(
            Cube::<i32>::new(usize::MAX, 2, 1),
            Err(CoreError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Cube::from_data(usize::MAX / 2, 3, 5, vec![0i32; 4]),
            Err(CoreError::InvalidDimensions { .. })
        ));
        assert_eq!(element_count(4, 4, 6), Ok(96));
    }

    #[test]
    fn test_sample_cube_rejects_small_dimensions() {
        assert!(SampleCube::new(Cube::new(1, 4, 6).unwrap(), 16).is_err());
        assert!(SampleCube::new(Cube::new(4, 1, 6).unwrap(), 16).is_err());
        assert!(SampleCube::new(Cube::new(4, 4, 0).unwrap(), 16).is_err());
        assert!(SampleCube::new(Cube::new(4, 4, 6).unwrap(), 0).is_err());
        assert!(SampleCube::new(Cube::new(2, 2, 1).unwrap(), 16).is_ok());
    }

    #[test]
    fn test_active_bands_capped_at_five() {
        let cube = SampleCube::new(Cube::new(3, 3, 8).unwrap(), 16).unwrap();
        assert_eq!(cube.active_bands(), 5);
        assert_eq!(cube.active_len(), 45);
        assert_eq!(cube.active().shape(), (3, 3, 5));

        let narrow = SampleCube::new(Cube::new(3, 3, 2).unwrap(), 16).unwrap();
        assert_eq!(narrow.active_bands(), 2);
    }

    #[test]
    fn test_matches_detects_single_difference() {
        let samples = Cube::from_fn(2, 2, 6, |r, c, b| (r + c + b) as i32);
        let cube = SampleCube::new(samples, 16).unwrap();

        let mut recon = cube.active().map(|&v| v as f64);
        assert!(cube.matches(&recon));

        recon[(1, 1, 4)] += 1.0;
        assert!(!cube.matches(&recon));
    }
}
