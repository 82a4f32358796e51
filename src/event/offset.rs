//! Wall-clock position on the score timeline.
//!
//! Offsets are integer microseconds so that events compare, hash and order
//! exactly. Millisecond accessors exist for display and tests.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A non-negative time offset from the start of the score, in microseconds.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Offset {
    micros: u64,
}

impl Offset {
    /// The very start of the timeline.
    pub const ZERO: Offset = Offset { micros: 0 };

    pub fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self {
            micros: millis.saturating_mul(1000),
        }
    }

    pub fn micros(self) -> u64 {
        self.micros
    }

    /// Milliseconds, truncated.
    pub fn millis(self) -> u64 {
        self.micros / 1000
    }

    pub fn as_millis_f64(self) -> f64 {
        self.micros as f64 / 1000.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.micros as f64 / 1_000_000.0
    }

    /// Sample index of this offset at `sample_rate`.
    pub fn to_sample_offset(self, sample_rate: u32) -> u64 {
        ((self.micros as u128 * sample_rate as u128 + 500_000) / 1_000_000) as u64
    }

    /// Scale by a percentage (used for quantization of audible length).
    pub fn percent(self, pct: u8) -> Self {
        let scaled = u128::from(self.micros) * u128::from(pct) / 100;
        Self {
            micros: u64::try_from(scaled).unwrap_or(u64::MAX),
        }
    }

    /// `self + rhs`, or `None` past the end of the representable timeline.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.micros.checked_add(rhs.micros).map(Self::from_micros)
    }
}

impl Add for Offset {
    type Output = Self;

    /// Saturating.
    fn add(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_add(rhs.micros),
        }
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Offset {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_sub(rhs.micros),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.micros % 1000 == 0 {
            write!(f, "{}ms", self.micros / 1000)
        } else {
            write!(f, "{:.3}ms", self.as_millis_f64())
        }
    }
}
