//! Sounding events — the unit of musical output produced by the score builder.
//!
//! A [`SoundingEvent`] is a plain value: two events are the same event exactly
//! when every field matches, offset included. The incremental differ relies on
//! this to tell newly added material from material already heard.

use std::fmt;

use super::offset::Offset;

/// Identifies a part (one instrument instance) within a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartId(pub u32);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single note sounding at a point on the score timeline.
///
/// Field order matters: the derived ordering sorts by offset first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SoundingEvent {
    /// When the note starts.
    pub offset: Offset,
    /// Which part plays it.
    pub part: PartId,
    /// MIDI note number (0–127).
    pub pitch: u8,
    /// Audible length (note length after quantization).
    pub duration: Offset,
    /// Volume in percent (0–100).
    pub volume: u8,
}

impl SoundingEvent {
    pub fn new(offset: Offset, part: PartId, pitch: u8, duration: Offset, volume: u8) -> Self {
        Self {
            offset,
            part,
            pitch,
            duration,
            volume,
        }
    }

    /// Velocity in the range 0.0–1.0, derived from volume.
    pub fn velocity(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }

    /// The same event moved to `offset`.
    pub fn at(&self, offset: Offset) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }
}
