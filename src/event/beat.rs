//! Musical length using integer ticks.
//!
//! Note lengths are kept at 960 PPQN so dotted and triplet values stay exact.
//! Conversion to wall-clock time happens only when a length is laid out at a
//! part's tempo (see [`Beat::at_tempo`]).

use std::cmp::Ordering;
use std::ops::{Add, Mul, Sub};

use super::offset::Offset;

/// Ticks per quarter note (beat). 960 divides cleanly by 2, 3, 4, 5, 6, 8, 10,
/// 12, 15, 16, 20, 24, 32, etc.
pub const TICKS_PER_BEAT: u64 = 960;

/// Ticks in a whole note; note value `n` lasts `TICKS_PER_WHOLE / n`.
const TICKS_PER_WHOLE: u64 = TICKS_PER_BEAT * 4;

/// A musical length measured in integer ticks at [`TICKS_PER_BEAT`] resolution.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Beat {
    ticks: u64,
}

impl Beat {
    /// Zero length.
    pub const ZERO: Beat = Beat { ticks: 0 };

    /// A quarter note, the default length of a fresh part.
    pub const QUARTER: Beat = Beat {
        ticks: TICKS_PER_BEAT,
    };

    /// Create a `Beat` from a raw tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Create a `Beat` from whole beats (quarter notes).
    pub fn from_beats(beats: u32) -> Self {
        Self {
            ticks: beats as u64 * TICKS_PER_BEAT,
        }
    }

    /// Length of note value `value` (4 = quarter, 8 = eighth, 3 = triplet half)
    /// with `dots` augmentation dots. Returns `None` for value 0 and for values
    /// too short to last a single tick.
    ///
    /// Each dot adds half of the previous addition: `c4.` is 1.5 beats,
    /// `c4..` is 1.75 beats.
    pub fn from_note_value(value: u32, dots: u32) -> Option<Self> {
        if value == 0 {
            return None;
        }
        let base = (TICKS_PER_WHOLE as f64 / value as f64).round() as u64;
        if base == 0 {
            return None;
        }
        let mut ticks = base;
        let mut addition = base;
        for _ in 0..dots {
            addition /= 2;
            ticks += addition;
        }
        Some(Self { ticks })
    }

    /// Return the raw tick count.
    pub fn ticks(self) -> u64 {
        self.ticks
    }

    /// Convert to a floating-point beat value.
    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_BEAT as f64
    }

    /// Wall-clock length of this beat span at `bpm` quarter notes per minute.
    ///
    /// Formula: `ticks * 60_000_000 / (TICKS_PER_BEAT * bpm)` microseconds.
    pub fn at_tempo(self, bpm: f64) -> Offset {
        let micros = self.ticks as f64 * 60_000_000.0 / (TICKS_PER_BEAT as f64 * bpm);
        Offset::from_micros(micros.round() as u64)
    }
}

impl Ord for Beat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_add(rhs.ticks),
        }
    }
}

impl Sub for Beat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_sub(rhs.ticks),
        }
    }
}

impl Mul<u32> for Beat {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self {
            ticks: self.ticks.saturating_mul(u64::from(rhs)),
        }
    }
}
