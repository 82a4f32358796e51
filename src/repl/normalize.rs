//! Offset normalizer: moves a batch of events to start at zero.

use crate::event::{Offset, SoundingEvent};

/// Shift every event back by the earliest offset, keeping their spacing.
pub fn normalize(events: &[SoundingEvent]) -> Vec<SoundingEvent> {
    let Some(start) = earliest(events) else {
        return Vec::new();
    };
    events.iter().map(|e| e.at(e.offset - start)).collect()
}

/// The earliest offset in `events`, if any.
pub fn earliest(events: &[SoundingEvent]) -> Option<Offset> {
    events.iter().map(|e| e.offset).min()
}
