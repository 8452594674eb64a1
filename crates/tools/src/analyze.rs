//! Predictor comparison

use anyhow::Result;
use hsi_core::cube::SampleCube;
use hsi_core::predictor::PredictorStrategy;
use serde::Serialize;

use crate::metrics;
use crate::pipeline::encode_source;

/// Source-coding result of one predictor strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorComparison {
    pub strategy: PredictorStrategy,
    pub distinct_residuals: usize,
    pub encoded_bits: usize,
    pub compression_ratio: f64,
    pub source_coding_time: f64,
}

/// Source-code `cube` with every strategy, in [`PredictorStrategy::ALL`] order
pub fn compare_predictors(cube: &SampleCube) -> Result<Vec<PredictorComparison>> {
    PredictorStrategy::ALL
        .into_iter()
        .map(|strategy| {
            let source = encode_source(cube, strategy)?;
            Ok(PredictorComparison {
                strategy,
                distinct_residuals: source.frequencies.len(),
                encoded_bits: source.bits.len(),
                compression_ratio: metrics::compression_ratio(
                    source.residuals.len(),
                    cube.bit_depth(),
                    source.bits.len(),
                ),
                source_coding_time: source.elapsed.as_secs_f64(),
            })
        })
        .collect()
}

/// Strategy with the highest compression ratio; ties go to the earlier one
pub fn best_predictor(results: &[PredictorComparison]) -> Option<&PredictorComparison> {
    results.iter().fold(None, |best, candidate| match best {
        Some(current) if current.compression_ratio >= candidate.compression_ratio => Some(current),
        _ => Some(candidate),
    })
}
