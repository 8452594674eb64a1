//! Run metrics and acceptance checks

use hsi_core::residual::SizeMismatch;
use hsi_frame::link::ValidationOutcome;
use serde::Serialize;

/// Compression ratio must exceed this
pub const MIN_COMPRESSION_RATIO: f64 = 4.0;
/// Post-correction BER must stay below this
pub const MAX_BER_AFTER: f64 = 1e-5;
/// Source-coding time per pixel may not exceed this many nanoseconds
pub const MAX_NS_PER_PIXEL: f64 = 216.0;

/// Everything measured during one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub compression_ratio: f64,
    pub ber_before: f64,
    pub ber_after: f64,
    /// Seconds spent in prediction, differencing, table build and entropy encoding
    pub source_coding_time: f64,
    pub per_pixel_time_ns: f64,
    /// Entropy-coded payload length
    pub encoded_bits: usize,
    /// Link-layer output length
    pub transmitted_bits: usize,
    /// Bits the channel inverted
    pub channel_flips: usize,
    pub valid_blocks: usize,
    pub invalid_blocks: usize,
    /// Codewords the Hamming decoder changed
    pub corrected_codewords: usize,
    pub dropped_tail_bits: usize,
    pub size_mismatch: Option<SizeMismatch>,
    pub compression_ok: bool,
    pub ber_ok: bool,
    pub timing_ok: bool,
    pub passed: bool,
    pub exact_match: bool,
}

impl MetricsRecord {
    /// Fill in the three acceptance flags and the overall verdict
    pub fn evaluate(&mut self) {
        self.compression_ok = self.compression_ratio > MIN_COMPRESSION_RATIO;
        self.ber_ok = self.ber_after < MAX_BER_AFTER;
        self.timing_ok = self.per_pixel_time_ns <= MAX_NS_PER_PIXEL;
        self.passed = self.compression_ok && self.ber_ok && self.timing_ok;
    }
}

/// Fraction of positions where the two sequences differ, over the shorter length
pub fn bit_error_rate(original: &[u8], received: &[u8]) -> f64 {
    let len = original.len().min(received.len());
    if len == 0 {
        return 0.0;
    }

    let errors = original
        .iter()
        .zip(received)
        .filter(|(a, b)| a != b)
        .count();
    errors as f64 / len as f64
}

/// BER over the payload bits of blocks that passed the CRC.
///
/// The original payload is restricted to the recovered block offsets that lie
/// inside it and compared position by position with the recovered payload.
/// No valid bits means a BER of zero.
pub fn validated_bit_error_rate(original: &[u8], outcome: &ValidationOutcome) -> f64 {
    let filtered: Vec<u8> = outcome
        .valid_bit_indices()
        .filter(|&index| index < original.len())
        .map(|index| original[index])
        .collect();

    bit_error_rate(&filtered, &outcome.payload)
}

/// Uncompressed size over entropy-coded size
pub fn compression_ratio(samples: usize, bit_depth: u32, encoded_bits: usize) -> f64 {
    if encoded_bits == 0 {
        return 0.0;
    }
    (samples as f64 * bit_depth as f64) / encoded_bits as f64
}
