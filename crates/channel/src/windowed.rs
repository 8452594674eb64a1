//! Regular-interval bit-error channels
//!
//! The windowed model is not a per-bit probability channel: the stream is cut
//! into consecutive windows of `window` bits (the last one may be shorter) and
//! exactly one uniformly chosen bit inside each window is inverted. The raw
//! bit error rate is therefore close to `1 / window`.

use crate::{ChannelError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A bit-level channel between link encoder and decoder
pub trait Channel {
    /// Pass `bits` through the channel and return what the receiver sees
    fn transmit(&mut self, bits: &[u8]) -> Vec<u8>;

    /// Statistics of the last transmission
    fn stats(&self) -> ChannelStats;
}

/// Per-transmission channel statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub bits: usize,
    pub flips: usize,
}

/// Flip exactly one random bit in every `window`-bit window of `bits`.
///
/// A window of 0 returns the input unchanged.
pub fn inject_errors<R: Rng>(bits: &[u8], window: usize, rng: &mut R) -> Vec<u8> {
    let mut corrupted = bits.to_vec();
    if window == 0 {
        return corrupted;
    }

    for start in (0..corrupted.len()).step_by(window) {
        let end = (start + window).min(corrupted.len());
        let position = rng.gen_range(start..end);
        corrupted[position] ^= 1;
    }

    corrupted
}

/// Seedable windowed error injector
#[derive(Debug, Clone)]
pub struct WindowedErrorChannel {
    window: usize,
    rng: ChaCha8Rng,
    stats: ChannelStats,
}

impl WindowedErrorChannel {
    /// Windowed channel; the same seed always yields the same error positions
    pub fn new(window: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            window,
            rng,
            stats: ChannelStats::default(),
        }
    }

    /// Channel from a configured error rate, which doubles as the window size
    pub fn from_error_rate(rate: i64, seed: Option<u64>) -> Result<Self> {
        let window = usize::try_from(rate).map_err(|_| ChannelError::NegativeErrorRate { rate })?;
        Ok(Self::new(window, seed))
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Channel for WindowedErrorChannel {
    fn transmit(&mut self, bits: &[u8]) -> Vec<u8> {
        let corrupted = inject_errors(bits, self.window, &mut self.rng);
        let flips = if self.window == 0 {
            0
        } else {
            bits.len().div_ceil(self.window)
        };

        tracing::debug!(
            "Channel flipped {} of {} bits (window {})",
            flips,
            bits.len(),
            self.window
        );
        self.stats = ChannelStats {
            bits: bits.len(),
            flips,
        };
        corrupted
    }

    fn stats(&self) -> ChannelStats {
        self.stats
    }
}

/// Channel that inverts a fixed set of bit positions
#[derive(Debug, Clone, Default)]
pub struct FixedFlipChannel {
    positions: Vec<usize>,
    stats: ChannelStats,
}

impl FixedFlipChannel {
    pub fn new(positions: Vec<usize>) -> Self {
        Self {
            positions,
            stats: ChannelStats::default(),
        }
    }
}

impl Channel for FixedFlipChannel {
    /// Positions past the end of the stream are ignored; a repeated position
    /// toggles the same bit again
    fn transmit(&mut self, bits: &[u8]) -> Vec<u8> {
        let mut corrupted = bits.to_vec();
        let mut flips = 0;
        for &position in &self.positions {
            if let Some(bit) = corrupted.get_mut(position) {
                *bit ^= 1;
                flips += 1;
            }
        }

        self.stats = ChannelStats {
            bits: bits.len(),
            flips,
        };
        corrupted
    }

    fn stats(&self) -> ChannelStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn differing(a: &[u8], b: &[u8]) -> Vec<usize> {
        a.iter()
            .zip(b)
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_zero_window_is_passthrough() {
        let bits = vec![1, 0, 1, 1, 0];
        let mut channel = WindowedErrorChannel::new(0, Some(3));
        assert_eq!(channel.transmit(&bits), bits);
        assert_eq!(channel.stats().flips, 0);
    }

    #[test]
    fn test_one_flip_per_window() {
        let bits = vec![0u8; 103];
        let mut channel = WindowedErrorChannel::new(10, Some(42));
        let received = channel.transmit(&bits);

        let flipped = differing(&bits, &received);
        assert_eq!(flipped.len(), 11);
        for (window, &position) in flipped.iter().enumerate() {
            assert_eq!(position / 10, window);
        }
        assert_eq!(channel.stats(), ChannelStats { bits: 103, flips: 11 });
    }

    #[test]
    fn test_window_larger_than_stream_flips_once() {
        let bits = vec![1u8; 40];
        let mut channel = WindowedErrorChannel::new(1000, Some(7));
        let received = channel.transmit(&bits);
        assert_eq!(differing(&bits, &received).len(), 1);
    }

    #[test]
    fn test_same_seed_same_errors() {
        let bits: Vec<u8> = (0..500).map(|i| (i % 3 == 0) as u8).collect();
        let mut a = WindowedErrorChannel::new(17, Some(1234));
        let mut b = WindowedErrorChannel::new(17, Some(1234));
        assert_eq!(a.transmit(&bits), b.transmit(&bits));
    }

    #[test]
    fn test_negative_error_rate_is_rejected() {
        assert_eq!(
            WindowedErrorChannel::from_error_rate(-1, None).unwrap_err(),
            ChannelError::NegativeErrorRate { rate: -1 }
        );
        assert_eq!(WindowedErrorChannel::from_error_rate(25, None).unwrap().window(), 25);
    }

    #[test]
    fn test_fixed_flips_ignore_out_of_range() {
        let mut channel = FixedFlipChannel::new(vec![1, 2, 99]);
        assert_eq!(channel.transmit(&[0, 0, 1, 1]), vec![0, 1, 0, 1]);
        assert_eq!(channel.stats().flips, 2);
    }

    #[quickcheck]
    fn prop_flip_count_matches_windows(len: u16, window: u8, seed: u64) -> bool {
        let bits = vec![0u8; len as usize % 2000];
        let window = window as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let received = inject_errors(&bits, window, &mut rng);

        let expected = if window == 0 { 0 } else { bits.len().div_ceil(window) };
        differing(&bits, &received).len() == expected
    }
}
