//! Spatial and spectral predictors
//!
//! Every strategy is a pure function of the sample cube and yields one real
//! prediction per element of the active sub-cube. Edge rows and columns that
//! lack the neighbour a strategy needs replicate the prediction of their
//! nearest interior neighbour.

use crate::cube::{Cube, PredictorArray, SampleCube};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available prediction strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictorStrategy {
    /// `sample(r, c + 1, b)`; the last column repeats the column before it
    #[default]
    RightNeighbor,
    /// `sample(r, c - 1, b)`; the first column repeats the column after it
    LeftNeighbor,
    /// `sample(r + 1, c, b)`; the last row repeats the row before it.
    ///
    /// Rows are counted from the bottom of the scene, so "top" is the next
    /// row in storage order.
    TopNeighbor,
    /// `sample(r - 1, c, b)`; the first row repeats the row after it
    BottomNeighbor,
    /// Mean of the four spatial neighbours
    NeighborAverage,
    /// Floor mean of the causal neighbourhood plus the previous band
    CausalAverage,
    /// Local-mean residuals with spectral neighbours weighted by 1/z
    WeightedSpectral,
}

impl PredictorStrategy {
    /// All strategies, in comparison-report order
    pub const ALL: [PredictorStrategy; 7] = [
        PredictorStrategy::RightNeighbor,
        PredictorStrategy::LeftNeighbor,
        PredictorStrategy::TopNeighbor,
        PredictorStrategy::BottomNeighbor,
        PredictorStrategy::NeighborAverage,
        PredictorStrategy::CausalAverage,
        PredictorStrategy::WeightedSpectral,
    ];

    /// Stable identifier used in configuration files and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            PredictorStrategy::RightNeighbor => "right-neighbor",
            PredictorStrategy::LeftNeighbor => "left-neighbor",
            PredictorStrategy::TopNeighbor => "top-neighbor",
            PredictorStrategy::BottomNeighbor => "bottom-neighbor",
            PredictorStrategy::NeighborAverage => "neighbor-average",
            PredictorStrategy::CausalAverage => "causal-average",
            PredictorStrategy::WeightedSpectral => "weighted-spectral",
        }
    }
}

impl fmt::Display for PredictorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PredictorStrategy {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        PredictorStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == wanted)
            .ok_or_else(|| crate::CoreError::InvalidConfiguration {
                msg: format!("Unknown predictor: {}", s),
            })
    }
}

/// Compute the predictor array for the active bands of `cube`
pub fn predict(cube: &SampleCube, strategy: PredictorStrategy) -> PredictorArray {
    let samples = cube.samples();
    let bands = cube.active_bands();

    let predictor = match strategy {
        PredictorStrategy::RightNeighbor => right_neighbor(samples, bands),
        PredictorStrategy::LeftNeighbor => left_neighbor(samples, bands),
        PredictorStrategy::TopNeighbor => top_neighbor(samples, bands),
        PredictorStrategy::BottomNeighbor => bottom_neighbor(samples, bands),
        PredictorStrategy::NeighborAverage => neighbor_average(samples, bands),
        PredictorStrategy::CausalAverage => causal_average(samples, bands),
        PredictorStrategy::WeightedSpectral => weighted_spectral(samples, bands),
    };

    tracing::debug!("{} predictor computed over {:?}", strategy, predictor.shape());
    predictor
}

fn right_neighbor(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        let source = (c + 1).min(cols - 1);
        samples[(r, source, b)] as f64
    })
}

fn left_neighbor(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        let source = c.saturating_sub(1);
        samples[(r, source, b)] as f64
    })
}

fn top_neighbor(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        let source = (r + 1).min(rows - 1);
        samples[(source, c, b)] as f64
    })
}

fn bottom_neighbor(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        let source = r.saturating_sub(1);
        samples[(source, c, b)] as f64
    })
}

/// Mean of the four toroidally shifted neighbours, after which the border
/// columns and then the border rows copy their inner neighbour.
fn neighbor_average(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    let mut predictor = Cube::from_fn(rows, cols, bands, |r, c, b| {
        let right = samples[(r, (c + 1) % cols, b)] as f64;
        let left = samples[(r, (c + cols - 1) % cols, b)] as f64;
        let below = samples[((r + 1) % rows, c, b)] as f64;
        let above = samples[((r + rows - 1) % rows, c, b)] as f64;
        (right + left + below + above) / 4.0
    });

    for r in 0..rows {
        for b in 0..bands {
            predictor[(r, cols - 1, b)] = predictor[(r, cols - 2, b)];
            predictor[(r, 0, b)] = predictor[(r, 1, b)];
        }
    }
    for c in 0..cols {
        for b in 0..bands {
            predictor[(rows - 1, c, b)] = predictor[(rows - 2, c, b)];
            predictor[(0, c, b)] = predictor[(1, c, b)];
        }
    }

    predictor
}

/// Causal spatial neighbours of `(r, c)`: left, top-left, top and, when it
/// exists, top-right. Requires `r >= 1` and `c >= 1`.
fn causal_neighbors(samples: &Cube<i32>, r: usize, c: usize, b: usize) -> Vec<i64> {
    let mut neighbors = vec![
        samples[(r - 1, c, b)] as i64,
        samples[(r, c - 1, b)] as i64,
        samples[(r - 1, c - 1, b)] as i64,
    ];
    if c + 1 < samples.cols() {
        neighbors.push(samples[(r - 1, c + 1, b)] as i64);
    }
    neighbors
}

/// Floor of the mean over the causal neighbours and the same pixel in the
/// previous band. The first row and first column predict zero.
fn causal_average(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        if r == 0 || c == 0 {
            return 0.0;
        }

        let mut neighbors = causal_neighbors(samples, r, c, b);
        if b > 0 {
            neighbors.push(samples[(r, c, b - 1)] as i64);
        }

        let sum: i64 = neighbors.iter().sum();
        sum.div_euclid(neighbors.len() as i64) as f64
    })
}

/// Weighted blend of spatial residuals around the local mean and of the
/// residuals of up to two preceding bands, weighted by `1 / z`. Predictions
/// are truncated toward zero; the first row and first column predict zero.
fn weighted_spectral(samples: &Cube<i32>, bands: usize) -> PredictorArray {
    let (rows, cols, _) = samples.shape();
    Cube::from_fn(rows, cols, bands, |r, c, b| {
        if r == 0 || c == 0 {
            return 0.0;
        }

        let spatial = causal_neighbors(samples, r, c, b);
        let local_mean = spatial.iter().sum::<i64>() as f64 / spatial.len() as f64;

        let mut residual_sum = 0.0;
        let mut weight_sum = 0.0;
        for &neighbor in &spatial {
            residual_sum += neighbor as f64 - local_mean;
            weight_sum += 1.0;
        }

        for z in 1..=2usize {
            if b >= z {
                let weight = 1.0 / z as f64;
                residual_sum += weight * (samples[(r, c, b - z)] as f64 - local_mean);
                weight_sum += weight;
            }
        }

        (residual_sum / weight_sum).trunc()
    })
}
