//! 3-bit CRC block check
//!
//! Systematic polynomial long division by `x^3 + x + 1` (0b1011). Blocks of
//! [`PAYLOAD_BITS`] bits get [`CRC_BITS`] check bits appended.

/// Generator polynomial, including the leading term
pub const CRC_POLY: u8 = 0b1011;

/// Width of the check value
pub const CRC_BITS: usize = 3;

/// Payload bits per block
pub const PAYLOAD_BITS: usize = 13;

/// Payload plus check bits
pub const BLOCK_BITS: usize = PAYLOAD_BITS + CRC_BITS;

/// Divide `register` in place; the remainder is left in its last
/// `CRC_BITS` positions.
fn divide(register: &mut [u8]) {
    if register.len() < CRC_BITS {
        return;
    }
    for i in 0..register.len() - CRC_BITS {
        if register[i] == 1 {
            for j in 0..=CRC_BITS {
                register[i + j] ^= (CRC_POLY >> (CRC_BITS - j)) & 1;
            }
        }
    }
}

/// Check value of `block`: remainder of `block · x^3` divided by the polynomial
pub fn crc_compute(block: &[u8]) -> [u8; CRC_BITS] {
    let mut register = Vec::with_capacity(block.len() + CRC_BITS);
    register.extend_from_slice(block);
    register.extend_from_slice(&[0; CRC_BITS]);
    divide(&mut register);

    let mut check = [0u8; CRC_BITS];
    check.copy_from_slice(&register[register.len() - CRC_BITS..]);
    check
}

/// True when `block_with_check` leaves a zero remainder
pub fn crc_verify(block_with_check: &[u8]) -> bool {
    let mut register = block_with_check.to_vec();
    divide(&mut register);
    register.iter().rev().take(CRC_BITS).all(|&bit| bit == 0)
}

/// Split `bits` into zero-padded 13-bit groups and append each group's check
pub fn frame_blocks(bits: &[u8]) -> Vec<[u8; BLOCK_BITS]> {
    bits.chunks(PAYLOAD_BITS)
        .map(|chunk| {
            let mut block = [0u8; BLOCK_BITS];
            block[..chunk.len()].copy_from_slice(chunk);
            let check = crc_compute(&block[..PAYLOAD_BITS]);
            block[PAYLOAD_BITS..].copy_from_slice(&check);
            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of(value: u16, width: usize) -> Vec<u8> {
        (0..width).rev().map(|i| ((value >> i) & 1) as u8).collect()
    }

    #[test]
    fn test_known_check_values() {
        // 1101 mod 1011 after shifting by three: remainder 001
        assert_eq!(crc_compute(&[1, 1, 0, 1]), [0, 0, 1]);
        assert_eq!(crc_compute(&[0; PAYLOAD_BITS]), [0, 0, 0]);
        assert_eq!(crc_compute(&bits_of(1, PAYLOAD_BITS)), [0, 1, 1]);
    }

    #[test]
    fn test_every_block_verifies() {
        for value in 0..(1u16 << PAYLOAD_BITS) {
            let mut block = bits_of(value, PAYLOAD_BITS);
            let check = crc_compute(&block);
            block.extend_from_slice(&check);
            assert!(crc_verify(&block), "block {:013b} failed", value);
        }
    }

    #[test]
    fn test_every_single_bit_error_is_detected() {
        for value in 0..(1u16 << PAYLOAD_BITS) {
            let mut block = bits_of(value, PAYLOAD_BITS);
            let check = crc_compute(&block);
            block.extend_from_slice(&check);

            for position in 0..BLOCK_BITS {
                block[position] ^= 1;
                assert!(!crc_verify(&block), "flip at {} of {:013b} passed", position, value);
                block[position] ^= 1;
            }
        }
    }

    #[test]
    fn test_frame_blocks_pads_final_group() {
        let bits = vec![1u8; 20];
        let blocks = frame_blocks(&bits);
        assert_eq!(blocks.len(), 2);
        assert_eq!(&blocks[1][..7], &[1; 7]);
        assert_eq!(&blocks[1][7..PAYLOAD_BITS], &[0; 6]);
        assert!(blocks.iter().all(|block| crc_verify(block)));

        assert!(frame_blocks(&[]).is_empty());
    }
}
