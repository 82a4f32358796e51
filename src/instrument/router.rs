//! Instrument router: dispatches events to the instrument loaded for their
//! part.

use std::collections::HashMap;

use log::debug;

use crate::event::{PartId, RenderContext, SoundingEvent};
use crate::repl::PlaybackScore;
use crate::score::Patch;

use super::{build, Instrument};

struct Route {
    patch: Patch,
    instrument: Box<dyn Instrument>,
}

/// Routes events to the instrument loaded for their part.
///
/// Parts are loaded explicitly; events for a part that was never loaded
/// render as silence.
pub struct InstrumentRouter {
    routes: HashMap<PartId, Route>,
    seed: u64,
}

impl InstrumentRouter {
    pub fn new(seed: u64) -> Self {
        Self {
            routes: HashMap::new(),
            seed,
        }
    }

    /// Load an instrument for every part `score` refers to that doesn't
    /// already have one with the same patch. Returns how many were loaded.
    pub fn load_instruments(&mut self, score: &PlaybackScore) -> usize {
        let mut loaded = 0;
        for (&id, info) in score.parts() {
            if self.routes.get(&id).is_some_and(|r| r.patch == info.patch) {
                continue;
            }
            debug!("loading {:?} for part {} ({})", info.patch, id, info.name);
            self.routes.insert(
                id,
                Route {
                    patch: info.patch,
                    instrument: build(info.patch, self.seed.wrapping_add(id.0 as u64)),
                },
            );
            loaded += 1;
        }
        loaded
    }

    pub fn is_loaded(&self, part: PartId) -> bool {
        self.routes.contains_key(&part)
    }

    /// Number of loaded parts.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drop every loaded instrument.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Render an event using its part's instrument.
    pub fn render(&self, event: &SoundingEvent, ctx: &RenderContext) -> Vec<f32> {
        match self.routes.get(&event.part) {
            Some(route) => route.instrument.render(event, ctx),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::EntryPoint;
    use crate::dsl::{Grammar, NotationGrammar};
    use crate::event::Offset;
    use crate::score::ScoreBuilder;

    fn ctx() -> RenderContext {
        RenderContext {
            sample_rate: 44100,
            channels: 2,
        }
    }

    fn playback(line: &str) -> PlaybackScore {
        let forms = NotationGrammar.parse(line, EntryPoint::Score).unwrap();
        let mut builder = ScoreBuilder::new();
        builder.evaluate(EntryPoint::Score, &forms).unwrap();
        let snapshot = builder.snapshot();
        PlaybackScore::new(snapshot.events().iter().cloned().collect(), &snapshot)
    }

    #[test]
    fn loads_each_part_once() {
        let score = playback("piano: c d bass: c");
        let mut router = InstrumentRouter::new(42);
        assert_eq!(router.load_instruments(&score), 2);
        assert_eq!(router.load_instruments(&score), 0);
        assert_eq!(router.len(), 2);
        assert!(router.is_loaded(PartId(0)));
        assert!(router.is_loaded(PartId(1)));
    }

    #[test]
    fn routes_to_loaded_instrument() {
        let score = playback("piano: c");
        let mut router = InstrumentRouter::new(42);
        router.load_instruments(&score);
        let out = router.render(&score.events()[0], &ctx());
        assert!(out.iter().any(|&s| s.abs() > 0.01));
    }

    #[test]
    fn unloaded_part_renders_silence() {
        let router = InstrumentRouter::new(42);
        let event = SoundingEvent::new(Offset::ZERO, PartId(7), 60, Offset::from_millis(100), 100);
        assert!(router.render(&event, &ctx()).is_empty());
    }

    #[test]
    fn changed_patch_reloads() {
        let mut router = InstrumentRouter::new(42);
        router.load_instruments(&playback("piano: c"));
        assert_eq!(router.load_instruments(&playback("drums: c")), 1);
        router.clear();
        assert!(router.is_empty());
    }
}
