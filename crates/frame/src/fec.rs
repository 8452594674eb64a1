//! Forward Error Correction (FEC) implementations

use crate::error::check_bits;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Generic FEC encoder trait
pub trait FecEncoder {
    /// Encode bits with error correction
    fn encode(&mut self, bits: &[u8]) -> Result<Vec<u8>>;

    /// Get the code rate (k/n where k is data bits, n is total bits)
    fn code_rate(&self) -> f64;

    /// Get overhead bits for given input length
    fn overhead_bits(&self, input_len: usize) -> usize;
}

/// Generic FEC decoder trait
pub trait FecDecoder {
    /// Decode bits and correct errors
    fn decode(&mut self, encoded: &[u8]) -> Result<Vec<u8>>;

    /// Get error statistics from last decode
    fn error_stats(&self) -> ErrorStats;
}

/// Error correction statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStats {
    /// Codewords processed
    pub codewords: usize,
    /// Codewords with a non-zero syndrome, each of which had one bit flipped
    pub corrected_errors: usize,
}

/// Systematic generator matrix: data bits followed by three parity bits
pub const GENERATOR: [[u8; 7]; 4] = [
    [1, 0, 0, 0, 1, 1, 0],
    [0, 1, 0, 0, 1, 0, 1],
    [0, 0, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];

/// Parity-check matrix; column `i` is the syndrome of an error at bit `i`
pub const PARITY_CHECK: [[u8; 7]; 3] = [
    [1, 1, 1, 0, 1, 0, 0],
    [1, 0, 1, 1, 0, 1, 0],
    [0, 1, 1, 1, 0, 0, 1],
];

/// Encode a data nibble as `nibble · G mod 2`
pub fn encode_nibble(nibble: [u8; 4]) -> [u8; 7] {
    let mut codeword = [0u8; 7];
    for (row, &bit) in GENERATOR.iter().zip(nibble.iter()) {
        if bit == 1 {
            for (out, &g) in codeword.iter_mut().zip(row.iter()) {
                *out ^= g;
            }
        }
    }
    codeword
}

/// `codeword · Hᵀ mod 2`
pub fn syndrome(codeword: &[u8; 7]) -> [u8; 3] {
    let mut syndrome = [0u8; 3];
    for (s, row) in syndrome.iter_mut().zip(PARITY_CHECK.iter()) {
        *s = row
            .iter()
            .zip(codeword.iter())
            .fold(0, |acc, (&h, &c)| acc ^ (h & c));
    }
    syndrome
}

/// Correct at most one bit and return the data nibble plus the flipped
/// position. Two or more errors alias to some other position and are
/// silently miscorrected.
pub fn decode_codeword(mut codeword: [u8; 7]) -> ([u8; 4], Option<usize>) {
    let syndrome = syndrome(&codeword);
    let mut corrected = None;

    if syndrome != [0, 0, 0] {
        corrected = (0..7).find(|&i| {
            PARITY_CHECK[0][i] == syndrome[0]
                && PARITY_CHECK[1][i] == syndrome[1]
                && PARITY_CHECK[2][i] == syndrome[2]
        });
        if let Some(position) = corrected {
            codeword[position] ^= 1;
        }
    }

    let mut nibble = [0u8; 4];
    nibble.copy_from_slice(&codeword[..4]);
    (nibble, corrected)
}

/// Hamming(7,4) codec over bit streams
#[derive(Debug, Clone, Default)]
pub struct Hamming74 {
    stats: ErrorStats,
}

impl Hamming74 {
    /// Data bits per codeword
    pub const DATA_BITS: usize = 4;
    /// Bits per codeword
    pub const CODEWORD_BITS: usize = 7;

    pub fn new() -> Self {
        Self::default()
    }
}

impl FecEncoder for Hamming74 {
    /// Zero-pad to a multiple of four and encode every nibble
    fn encode(&mut self, bits: &[u8]) -> Result<Vec<u8>> {
        check_bits(bits)?;

        let mut encoded = Vec::with_capacity(bits.len().div_ceil(Self::DATA_BITS) * Self::CODEWORD_BITS);
        for chunk in bits.chunks(Self::DATA_BITS) {
            let mut nibble = [0u8; 4];
            nibble[..chunk.len()].copy_from_slice(chunk);
            encoded.extend_from_slice(&encode_nibble(nibble));
        }

        Ok(encoded)
    }

    fn code_rate(&self) -> f64 {
        Self::DATA_BITS as f64 / Self::CODEWORD_BITS as f64
    }

    fn overhead_bits(&self, input_len: usize) -> usize {
        input_len.div_ceil(Self::DATA_BITS) * (Self::CODEWORD_BITS - Self::DATA_BITS)
    }
}

impl FecDecoder for Hamming74 {
    /// Decode every complete 7-bit codeword; a trailing partial one is ignored
    fn decode(&mut self, encoded: &[u8]) -> Result<Vec<u8>> {
        check_bits(encoded)?;

        self.stats = ErrorStats::default();
        let mut decoded = Vec::with_capacity(encoded.len() / Self::CODEWORD_BITS * Self::DATA_BITS);
        for chunk in encoded.chunks_exact(Self::CODEWORD_BITS) {
            let mut codeword = [0u8; 7];
            codeword.copy_from_slice(chunk);

            let (nibble, corrected) = decode_codeword(codeword);
            self.stats.codewords += 1;
            if corrected.is_some() {
                self.stats.corrected_errors += 1;
            }
            decoded.extend_from_slice(&nibble);
        }

        Ok(decoded)
    }

    fn error_stats(&self) -> ErrorStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nibble(value: u8) -> [u8; 4] {
        [(value >> 3) & 1, (value >> 2) & 1, (value >> 1) & 1, value & 1]
    }

    #[test]
    fn test_codewords_are_systematic_with_zero_syndrome() {
        for value in 0..16 {
            let data = nibble(value);
            let codeword = encode_nibble(data);
            assert_eq!(&codeword[..4], &data);
            assert_eq!(syndrome(&codeword), [0, 0, 0]);
        }
    }

    #[test]
    fn test_corrects_every_single_bit_error() {
        for value in 0..16 {
            let data = nibble(value);
            for position in 0..7 {
                let mut codeword = encode_nibble(data);
                codeword[position] ^= 1;
                let (decoded, corrected) = decode_codeword(codeword);
                assert_eq!(decoded, data, "nibble {:04b}, flip {}", value, position);
                assert_eq!(corrected, Some(position));
            }
        }
    }

    #[test]
    fn test_double_error_is_miscorrected() {
        let data = nibble(0b1010);
        let mut codeword = encode_nibble(data);
        codeword[0] ^= 1;
        codeword[1] ^= 1;

        // syndrome of bits 0 and 1 equals column 3, so bit 3 is flipped as well
        let (decoded, corrected) = decode_codeword(codeword);
        assert_eq!(corrected, Some(3));
        assert_eq!(decoded, [0, 1, 1, 1]);
        assert_ne!(decoded, data);
    }

    #[test]
    fn test_stream_encode_pads_to_nibbles() {
        let mut hamming = Hamming74::new();
        let encoded = hamming.encode(&[1, 0, 1, 1, 1]).unwrap();
        assert_eq!(encoded.len(), 14);
        assert_eq!(&encoded[7..11], &[1, 0, 0, 0]);
        assert_eq!(hamming.overhead_bits(5), 6);
        assert!((hamming.code_rate() - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_stream_decode_counts_corrections() {
        let mut hamming = Hamming74::new();
        let bits = [1, 1, 0, 0, 0, 1, 1, 0];
        let mut encoded = hamming.encode(&bits).unwrap();
        encoded[2] ^= 1;
        encoded[13] ^= 1;
        encoded.push(1); // partial trailing codeword

        let decoded = hamming.decode(&encoded).unwrap();
        assert_eq!(decoded, bits);
        assert_eq!(
            hamming.error_stats(),
            ErrorStats { codewords: 2, corrected_errors: 2 }
        );
    }

    #[test]
    fn test_rejects_non_binary_input() {
        let mut hamming = Hamming74::new();
        assert!(hamming.encode(&[0, 1, 2]).is_err());
        assert!(hamming.decode(&[0, 0, 0, 0, 0, 0, 5]).is_err());
    }
}
