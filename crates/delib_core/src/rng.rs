//! Deterministic, seedable RNG (grounded on the teacher crate's `rng`
//! module: ChaCha20 seeded from an explicit integer, never OS entropy by
//! default). Two call sites need exactly this shape:
//!
//! - the Partitioner's one-time shuffle before splitting into subgroups
//!   (spec §4.2: "shuffled once with a seeded pseudo-random permutation");
//! - the Oracle's fallback uniform-random permutation when every structured
//!   parse attempt fails (spec §4.4), which the spec requires to be
//!   injectable so tests can make fallbacks reproducible.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Newtype over `ChaCha20Rng` used anywhere the engine needs a reproducible
/// shuffle or permutation.
#[derive(Debug, Clone)]
pub struct DeliberationRng(ChaCha20Rng);

impl DeliberationRng {
    /// Construct from a 64-bit seed. The seed is embedded little-endian in
    /// the first 8 bytes of the 32-byte ChaCha20 seed; the remainder is
    /// zero, matching the teacher crate's convention.
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self(ChaCha20Rng::from_seed(seed32))
    }

    /// Unbiased integer in `[0, n)` via rejection sampling. Returns `None`
    /// iff `n == 0`.
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.0.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Deterministic in-place Fisher–Yates shuffle.
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        if len <= 1 {
            return;
        }
        let mut i = len - 1;
        loop {
            let j = self.gen_range((i as u64) + 1).unwrap_or(0) as usize;
            slice.swap(i, j);
            if i == 0 {
                break;
            }
            i -= 1;
        }
    }

    /// Return a shuffled copy of `items`, leaving the input untouched.
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        self.shuffle_in_place(&mut out);
        out
    }

    /// A uniformly random permutation of `0..n`, used for Oracle fallback
    /// rankings (spec §4.4).
    pub fn random_permutation(&mut self, n: usize) -> Vec<u32> {
        let mut perm: Vec<u32> = (0..n as u32).collect();
        self.shuffle_in_place(&mut perm);
        perm
    }
}

impl Default for DeliberationRng {
    /// Seeds from a fresh, process-local counter-free default — callers that
    /// care about reproducibility should always call `from_seed_u64`
    /// explicitly; this exists only so `DeliberationRng` can be a struct
    /// field default in tests that don't care about the seed.
    fn default() -> Self {
        Self::from_seed_u64(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_range_zero_is_none() {
        let mut rng = DeliberationRng::from_seed_u64(7);
        assert_eq!(rng.gen_range(0), None);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DeliberationRng::from_seed_u64(42);
        let mut b = DeliberationRng::from_seed_u64(42);
        let xs: Vec<_> = (0..20).map(|_| a.gen_range(100)).collect();
        let ys: Vec<_> = (0..20).map(|_| b.gen_range(100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = DeliberationRng::from_seed_u64(1234);
        let items: Vec<u32> = (0..9).collect();
        let shuffled = rng.shuffled(&items);
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    #[test]
    fn random_permutation_is_valid() {
        let mut rng = DeliberationRng::from_seed_u64(99);
        let perm = rng.random_permutation(6);
        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..6).collect::<Vec<u32>>());
    }
}
