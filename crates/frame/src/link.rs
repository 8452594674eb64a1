//! Link layer combining the CRC block check with Hamming(7,4)
//!
//! In [`LinkMode::CrcHamming`] every 13 payload bits gain a 3-bit CRC and the
//! resulting 16 bits travel as four Hamming codewords (28 bits). Blocks whose
//! CRC fails after Hamming correction are erased, never retransmitted.
//! [`LinkMode::HammingOnly`] skips the CRC and trusts every decoded codeword.

use crate::crc::{crc_verify, frame_blocks, BLOCK_BITS, PAYLOAD_BITS};
use crate::fec::{ErrorStats, FecDecoder, FecEncoder, Hamming74};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Transmitted bits per protected block: four 7-bit codewords
pub const LINK_BLOCK_BITS: usize = BLOCK_BITS / Hamming74::DATA_BITS * Hamming74::CODEWORD_BITS;

/// Link protection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    /// CRC framing inside Hamming(7,4), with block erasure
    #[default]
    CrcHamming,
    /// Hamming(7,4) alone, no validity check
    HammingOnly,
}

impl LinkMode {
    pub fn from_use_crc(use_crc: bool) -> Self {
        if use_crc {
            LinkMode::CrcHamming
        } else {
            LinkMode::HammingOnly
        }
    }
}

/// Result of decoding a CRC-protected stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Payload bits of every block that passed the CRC, in order
    pub payload: Vec<u8>,
    /// Pre-FEC block index of every valid block
    pub valid_block_indices: Vec<usize>,
    pub valid_blocks: usize,
    pub invalid_blocks: usize,
}

impl ValidationOutcome {
    /// Pre-FEC bit offsets of the recovered payload bits.
    ///
    /// Block `k` always covers offsets `13k .. 13k + 13`, whether or not
    /// earlier blocks were erased.
    pub fn valid_bit_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.valid_block_indices
            .iter()
            .flat_map(|&block| block * PAYLOAD_BITS..(block + 1) * PAYLOAD_BITS)
    }

    /// Total blocks seen by the decoder
    pub fn total_blocks(&self) -> usize {
        self.valid_blocks + self.invalid_blocks
    }
}

/// Decoded link output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutput {
    Validated(ValidationOutcome),
    Unchecked(Vec<u8>),
}

impl LinkOutput {
    /// Recovered payload bits
    pub fn payload(&self) -> &[u8] {
        match self {
            LinkOutput::Validated(outcome) => &outcome.payload,
            LinkOutput::Unchecked(bits) => bits,
        }
    }

    pub fn validation(&self) -> Option<&ValidationOutcome> {
        match self {
            LinkOutput::Validated(outcome) => Some(outcome),
            LinkOutput::Unchecked(_) => None,
        }
    }
}

/// Link layer encoder/decoder
#[derive(Debug, Clone, Default)]
pub struct LinkLayer {
    mode: LinkMode,
    hamming: Hamming74,
    last_stats: ErrorStats,
}

impl LinkLayer {
    pub fn new(mode: LinkMode) -> Self {
        Self {
            mode,
            hamming: Hamming74::new(),
            last_stats: ErrorStats::default(),
        }
    }

    /// Hamming statistics accumulated over the last decode
    pub fn last_stats(&self) -> ErrorStats {
        self.last_stats
    }

    /// Protect `bits` for transmission
    pub fn encode(&mut self, bits: &[u8]) -> Result<Vec<u8>> {
        let encoded = match self.mode {
            LinkMode::CrcHamming => {
                let blocks = frame_blocks(bits);
                let framed: Vec<u8> = blocks.iter().flatten().copied().collect();
                self.hamming.encode(&framed)?
            }
            LinkMode::HammingOnly => self.hamming.encode(bits)?,
        };

        tracing::debug!(
            "{:?} link encoded {} payload bits into {} channel bits",
            self.mode,
            bits.len(),
            encoded.len()
        );
        Ok(encoded)
    }

    /// Recover payload bits from `received`.
    ///
    /// `expected_len` is only used by [`LinkMode::HammingOnly`], whose output
    /// is truncated or zero-padded to that length.
    pub fn decode(&mut self, received: &[u8], expected_len: usize) -> Result<LinkOutput> {
        match self.mode {
            LinkMode::CrcHamming => Ok(LinkOutput::Validated(self.decode_validated(received)?)),
            LinkMode::HammingOnly => {
                let mut decoded = self.hamming.decode(received)?;
                self.last_stats = self.hamming.error_stats();
                decoded.resize(expected_len, 0);
                Ok(LinkOutput::Unchecked(decoded))
            }
        }
    }

    fn decode_validated(&mut self, received: &[u8]) -> Result<ValidationOutcome> {
        let mut outcome = ValidationOutcome::default();
        let mut stats = ErrorStats::default();

        // An incomplete trailing window is discarded by chunks_exact
        for (index, window) in received.chunks_exact(LINK_BLOCK_BITS).enumerate() {
            let block = self.hamming.decode(window)?;
            let window_stats = self.hamming.error_stats();
            stats.codewords += window_stats.codewords;
            stats.corrected_errors += window_stats.corrected_errors;

            if crc_verify(&block) {
                outcome.payload.extend_from_slice(&block[..PAYLOAD_BITS]);
                outcome.valid_block_indices.push(index);
                outcome.valid_blocks += 1;
            } else {
                tracing::debug!("Block {} failed CRC, erased", index);
                outcome.invalid_blocks += 1;
            }
        }

        self.last_stats = stats;
        Ok(outcome)
    }
}
