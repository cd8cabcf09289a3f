//! Integer-first numeric newtypes.
//!
//! Percentages and scores arrive as messy reals; they are fixed to integer
//! units once at construction so every later comparison and sum is exact:
//! - `Pct`: tenths of a percent, 0..=1000.
//! - `Score`: thousandths of a point, clamped to be non-negative.
//!
//! Construction from `f64` absorbs garbage (NaN, negatives, out-of-range)
//! per the engine's degrade-gracefully edge policy.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Percentage share in tenths of a percent (37.5% → `Pct(375)`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pct(u32);

impl Pct {
    pub const ZERO: Pct = Pct(0);
    pub const FULL: Pct = Pct(1000);

    /// Clamp to [0, 100] and round to one decimal. NaN and negatives → 0%.
    pub fn from_percent_f64(v: f64) -> Self {
        if !(v > 0.0) {
            return Pct(0);
        }
        if v >= 100.0 {
            return Pct(1000);
        }
        // round half up to tenths; v is finite and in (0, 100) here
        Pct((v * 10.0 + 0.5) as u32)
    }

    pub fn from_tenths(tenths: u32) -> Self {
        Pct(tenths.min(1000))
    }

    pub fn as_tenths(self) -> u32 { self.0 }

    pub fn as_f64(self) -> f64 { self.0 as f64 / 10.0 }

    pub fn is_zero(self) -> bool { self.0 == 0 }

    /// `round_half_up(total × pct)` in pure integer arithmetic.
    pub fn share_of(self, total: u32) -> u32 {
        ((total as u64 * self.0 as u64 + 500) / 1000) as u32
    }
}

/// Candidate score in thousandths of a point (850.25 → `Score(850_250)`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Score(u64);

impl Score {
    pub const ZERO: Score = Score(0);

    /// NaN and negatives rank as 0 (missing/non-numeric scores go last).
    pub fn from_f64(v: f64) -> Self {
        if !(v > 0.0) {
            return Score(0);
        }
        Score((v * 1000.0 + 0.5) as u64)
    }

    pub fn from_thousandths(t: u64) -> Self { Score(t) }

    pub fn as_thousandths(self) -> u64 { self.0 }

    pub fn as_f64(self) -> f64 { self.0 as f64 / 1000.0 }
}
