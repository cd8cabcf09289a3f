//! Seeded RNG for **ties only** (no OS entropy).
//!
//! The allocator reaches for randomness exclusively when the secondary tie
//! criteria leave a residue of indistinguishable candidates; seeding from
//! the policy keeps repeated runs on identical snapshots bit-identical.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

use crate::policy::DEFAULT_TIE_SEED;

/// Newtype over ChaCha20Rng for tie-breaking.
pub struct TieRng(ChaCha20Rng);

/// Create a tie RNG from an integer seed.
pub fn tie_rng_from_seed(seed: u64) -> TieRng {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    TieRng(ChaCha20Rng::from_seed(bytes))
}

impl TieRng {
    /// Uniform index in `0..n` via rejection sampling (no modulo bias).
    /// Returns `None` when `n == 0`.
    pub fn pick(&mut self, n: usize) -> Option<usize> {
        if n == 0 { return None; }
        let n_u64 = n as u64;
        let zone = u64::MAX - (u64::MAX % n_u64);
        loop {
            let x = self.0.next_u64();
            if x < zone {
                return Some((x % n_u64) as usize);
            }
        }
    }
}

impl Default for TieRng {
    fn default() -> Self { tie_rng_from_seed(DEFAULT_TIE_SEED) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = tie_rng_from_seed(7);
        let mut b = tie_rng_from_seed(7);
        for _ in 0..32 {
            assert_eq!(a.pick(5), b.pick(5));
        }
    }

    #[test]
    fn pick_bounds() {
        let mut r = tie_rng_from_seed(1);
        assert_eq!(r.pick(0), None);
        for _ in 0..64 {
            let i = r.pick(3).unwrap();
            assert!(i < 3);
        }
    }
}
