//! Deterministic seeds for mock generation.
//!
//! Every "random" choice in a report or draw flows from a [`Seed`] or from
//! [`seeded_fraction`], so readings are reproducible and shareable by value.
//!
//! ## Determinism Guarantees
//!
//! - Same identity string → same seed, on every platform
//! - The hash walks UTF-16 code units, so seeds match those produced by the
//!   browser front end for the same (mostly multi-byte) input
//! - Not cryptographic: collisions are tolerated

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::BirthProfileInput;

/// Non-negative integer seed derived from identity text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seed(u32);

impl Seed {
    /// Wrap a raw seed value.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Hash an identity string.
    ///
    /// 32-bit rolling hash `h = h * 31 + unit` with wrapping arithmetic,
    /// returned as its absolute value.
    pub fn from_identity(text: &str) -> Self {
        let hash = text.encode_utf16().fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });
        Self(hash.unsigned_abs())
    }

    /// Seed for a birth profile (`name-date-time-city`).
    pub fn from_profile(input: &BirthProfileInput) -> Self {
        Self::from_identity(&input.identity())
    }

    /// Raw value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Logical right shift, used to derive per-row variation.
    pub fn shifted(&self, bits: u32) -> u32 {
        self.0.checked_shr(bits).unwrap_or(0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Sine-based fractional generator in `[0, 1)`.
///
/// `frac(sin(n) * 10000)`. Cheap, stateless, and identical for identical `n`.
pub fn seeded_fraction(n: i64) -> f64 {
    let x = (n as f64).sin() * 10_000.0;
    let fraction = x - x.floor();
    // Guard against rounding up to exactly 1.0.
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

/// Pick an index in `0..len` from the fractional generator.
///
/// Returns 0 for an empty range.
pub fn seeded_index(n: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((seeded_fraction(n) * len as f64).floor() as usize) % len
}
