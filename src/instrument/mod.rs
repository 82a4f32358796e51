//! Instruments — synthesized voices for every stock patch.

pub mod envelope;
pub mod oscillator;
pub mod percussion;
pub mod pluck;
pub mod router;
pub mod tone;

pub use percussion::Percussion;
pub use pluck::PluckSynth;
pub use router::InstrumentRouter;
pub use tone::ToneSynth;

use crate::event::{RenderContext, SoundingEvent};
use crate::score::Patch;

/// Common interface for all instruments.
///
/// Each instrument takes an event and render context, and produces
/// interleaved sample data starting at the event's onset.
pub trait Instrument: Send {
    /// Render a single event into interleaved samples.
    fn render(&self, event: &SoundingEvent, ctx: &RenderContext) -> Vec<f32>;

    /// Human-readable name for this instrument.
    fn name(&self) -> &str;
}

/// Build the instrument that plays `patch`.
pub fn build(patch: Patch, seed: u64) -> Box<dyn Instrument> {
    match patch {
        Patch::Keys => Box::new(ToneSynth::keys()),
        Patch::Organ => Box::new(ToneSynth::organ()),
        Patch::Pad => Box::new(ToneSynth::pad()),
        Patch::Bass => Box::new(ToneSynth::bass()),
        Patch::Lead(waveform) => Box::new(ToneSynth::lead(waveform)),
        Patch::Pluck => Box::new(PluckSynth::new(seed)),
        Patch::Percussion => Box::new(Percussion::new(seed)),
    }
}
