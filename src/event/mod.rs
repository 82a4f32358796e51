//! Event model — musical lengths, timeline offsets and sounding events.
//!
//! Lengths are written in musical terms ([`Beat`]) and laid out on the
//! timeline in wall-clock terms ([`Offset`]) using each part's tempo.

pub mod beat;
pub mod offset;
pub mod types;

pub use beat::{Beat, TICKS_PER_BEAT};
pub use offset::Offset;
pub use types::{PartId, SoundingEvent};

/// Context passed to instruments when rendering an event.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub sample_rate: u32,
    pub channels: u16,
}
