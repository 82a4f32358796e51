//! Event differ: finds the material a line added to the score.

use crate::event::SoundingEvent;
use crate::score::Score;

/// Events in `new` that are not in `old`, compared by full value, in
/// timeline order.
///
/// Two events that differ only in offset are different events, so a
/// repeated phrase later in the score is still new.
pub fn new_events(old: &Score, new: &Score) -> Vec<SoundingEvent> {
    new.events()
        .difference(old.events())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Offset, PartId};
    use std::collections::{BTreeMap, BTreeSet};

    fn ev(ms: u64, pitch: u8) -> SoundingEvent {
        SoundingEvent::new(
            Offset::from_millis(ms),
            PartId(0),
            pitch,
            Offset::from_millis(450),
            100,
        )
    }

    fn score(events: &[SoundingEvent]) -> Score {
        Score::new(events.iter().cloned().collect::<BTreeSet<_>>(), BTreeMap::new())
    }

    #[test]
    fn identical_scores_have_no_new_events() {
        let s = score(&[ev(0, 60), ev(500, 62)]);
        assert!(new_events(&s, &s).is_empty());
    }

    #[test]
    fn everything_is_new_against_empty() {
        let s = score(&[ev(500, 62), ev(0, 60)]);
        assert_eq!(new_events(&Score::default(), &s), vec![ev(0, 60), ev(500, 62)]);
    }

    #[test]
    fn only_added_events() {
        let old = score(&[ev(0, 60), ev(500, 62)]);
        let new = score(&[ev(0, 60), ev(500, 62), ev(1000, 64), ev(1500, 65)]);
        assert_eq!(new_events(&old, &new), vec![ev(1000, 64), ev(1500, 65)]);
    }

    #[test]
    fn same_note_at_another_offset_is_new() {
        let old = score(&[ev(0, 60)]);
        let new = score(&[ev(0, 60), ev(500, 60)]);
        assert_eq!(new_events(&old, &new), vec![ev(500, 60)]);
    }

    #[test]
    fn differing_payload_is_new() {
        let old = score(&[ev(0, 60)]);
        let louder = SoundingEvent::new(
            Offset::ZERO,
            PartId(0),
            60,
            Offset::from_millis(450),
            80,
        );
        let new = score(&[ev(0, 60), louder.clone()]);
        assert_eq!(new_events(&old, &new), vec![louder]);
    }
}
