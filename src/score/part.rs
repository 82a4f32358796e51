//! Per-part evaluation state.
//!
//! Each part keeps its own attributes and timeline position. Notes, rests
//! and chords are laid out here; part selection and global attributes are
//! handled by the builder.

use std::collections::BTreeMap;

use crate::dsl::ast::{ChordMember, Length, NoteForm, OctaveChange};
use crate::dsl::note::midi_pitch;
use crate::event::{Beat, Offset, PartId, SoundingEvent};

use super::catalog::Patch;
use super::error::EvalError;

/// Slowest accepted tempo, in quarter notes per minute.
pub const MIN_TEMPO: f64 = 1.0;
/// Fastest accepted tempo.
pub const MAX_TEMPO: f64 = 1000.0;
/// Lowest and highest octave a part may be set to.
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = -1..=9;

/// Display and sound information for a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInfo {
    /// Alias if the part has one, otherwise the stock instrument name.
    pub name: String,
    /// Stock instrument name.
    pub instrument: String,
    pub patch: Patch,
}

/// Attributes that shape how notes are laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    /// Quarter notes per minute.
    pub tempo: f64,
    pub octave: i32,
    /// Length used by notes and rests that don't give one.
    pub length: Beat,
    /// Percent, 0–100.
    pub volume: u8,
    /// Percent of the note length that actually sounds.
    pub quant: u8,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            octave: 4,
            length: Beat::QUARTER,
            volume: 100,
            quant: 90,
        }
    }
}

impl Attributes {
    /// Set a named attribute, validating its value.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), EvalError> {
        let out_of_range = || EvalError::AttributeOutOfRange {
            name: name.to_string(),
            value,
        };
        match name {
            "tempo" => {
                if !(MIN_TEMPO..=MAX_TEMPO).contains(&value) {
                    return Err(out_of_range());
                }
                self.tempo = value;
            }
            "vol" | "volume" => {
                if !(0.0..=100.0).contains(&value) {
                    return Err(out_of_range());
                }
                self.volume = value.round() as u8;
            }
            "quant" | "quantize" | "quantization" => {
                if !(0.0..=100.0).contains(&value) {
                    return Err(out_of_range());
                }
                self.quant = value.round() as u8;
            }
            "octave" => {
                if value.fract() != 0.0 || !OCTAVE_RANGE.contains(&(value as i32)) {
                    return Err(out_of_range());
                }
                self.octave = value as i32;
            }
            _ => return Err(EvalError::UnknownAttribute(name.to_string())),
        }
        Ok(())
    }
}

/// Where one voice of a group has got to.
#[derive(Debug, Clone)]
struct VoiceState {
    attrs: Attributes,
    offset: Offset,
}

/// An open `V1: … V2: …` group.
#[derive(Debug, Clone)]
struct VoiceGroup {
    start: Offset,
    /// Attributes in force when the group opened; new voices start from these.
    base: Attributes,
    active: u32,
    /// Saved state of the voices that aren't active.
    parked: BTreeMap<u32, VoiceState>,
}

/// Mutable evaluation state for one part.
#[derive(Debug, Clone)]
pub struct PartState {
    pub id: PartId,
    pub info: PartInfo,
    pub attrs: Attributes,
    pub offset: Offset,
    voices: Option<VoiceGroup>,
}

impl PartState {
    pub fn new(id: PartId, info: PartInfo, attrs: Attributes) -> Self {
        Self {
            id,
            info,
            attrs,
            offset: Offset::ZERO,
            voices: None,
        }
    }

    /// Lay out a note at the current offset and advance past it.
    pub fn note(&mut self, note: &NoteForm) -> Result<SoundingEvent, EvalError> {
        let (event, step) = self.sound(note)?;
        self.advance(step)?;
        Ok(event)
    }

    /// Advance past a rest.
    pub fn rest(&mut self, length: Option<&Length>) -> Result<(), EvalError> {
        let step = self.step(length)?;
        self.advance(step)
    }

    /// Lay out chord members together, then advance by the shortest one.
    pub fn chord(&mut self, members: &[ChordMember]) -> Result<Vec<SoundingEvent>, EvalError> {
        let mut events = Vec::with_capacity(members.len());
        let mut shortest: Option<Offset> = None;

        for member in members {
            let step = match member {
                ChordMember::Note(note) => {
                    let (event, step) = self.sound(note)?;
                    events.push(event);
                    step
                }
                ChordMember::Rest(length) => self.step(length.as_ref())?,
            };
            shortest = Some(shortest.map_or(step, |s| s.min(step)));
        }

        if let Some(step) = shortest {
            self.advance(step)?;
        }
        Ok(events)
    }

    /// `o<n>` must name an octave in [`OCTAVE_RANGE`]; `>` and `<` may leave
    /// it, and the next note then fails its pitch check.
    pub fn octave(&mut self, change: OctaveChange) -> Result<(), EvalError> {
        match change {
            OctaveChange::Set(n) => {
                let octave = i32::try_from(n)
                    .ok()
                    .filter(|o| OCTAVE_RANGE.contains(o))
                    .ok_or_else(|| EvalError::AttributeOutOfRange {
                        name: "octave".to_string(),
                        value: f64::from(n),
                    })?;
                self.attrs.octave = octave;
            }
            OctaveChange::Up => self.attrs.octave = self.attrs.octave.saturating_add(1),
            OctaveChange::Down => self.attrs.octave = self.attrs.octave.saturating_sub(1),
        }
        Ok(())
    }

    /// Switch to voice `n`, opening a group if none is open. Voice 0 closes
    /// the group.
    pub fn voice(&mut self, n: u32) {
        if n == 0 {
            self.close_voices();
            return;
        }

        let (start, base) = (self.offset, self.attrs.clone());
        let group = self.voices.get_or_insert_with(|| VoiceGroup {
            start,
            base,
            active: n,
            parked: BTreeMap::new(),
        });

        if group.active == n {
            return;
        }

        group.parked.insert(
            group.active,
            VoiceState {
                attrs: self.attrs.clone(),
                offset: self.offset,
            },
        );

        let next = group.parked.remove(&n).unwrap_or_else(|| VoiceState {
            attrs: group.base.clone(),
            offset: group.start,
        });
        group.active = n;
        self.attrs = next.attrs;
        self.offset = next.offset;
    }

    /// End any open voice group, moving the part to its furthest voice.
    pub fn close_voices(&mut self) {
        if let Some(group) = self.voices.take() {
            let furthest = group
                .parked
                .values()
                .map(|v| v.offset)
                .fold(self.offset, Offset::max);
            self.offset = furthest;
        }
    }

    pub fn in_voice_group(&self) -> bool {
        self.voices.is_some()
    }

    /// Build the event for `note` without moving, returning it with the
    /// distance to the next note.
    fn sound(&mut self, note: &NoteForm) -> Result<(SoundingEvent, Offset), EvalError> {
        let step = self.step(note.length.as_ref())?;
        let pitch = midi_pitch(note.letter, note.accidentals, self.attrs.octave).ok_or(
            EvalError::PitchOutOfRange {
                letter: note.letter,
                octave: self.attrs.octave,
            },
        )?;
        let event = SoundingEvent::new(
            self.offset,
            self.id,
            pitch,
            step.percent(self.attrs.quant),
            self.attrs.volume,
        );
        Ok((event, step))
    }

    fn advance(&mut self, step: Offset) -> Result<(), EvalError> {
        self.offset = self
            .offset
            .checked_add(step)
            .ok_or(EvalError::TimelineOverflow)?;
        Ok(())
    }

    /// Resolve an optional explicit length (making it sticky) to wall time.
    fn step(&mut self, length: Option<&Length>) -> Result<Offset, EvalError> {
        if let Some(length) = length {
            self.attrs.length = beats(length)?;
        }
        Ok(self.attrs.length.at_tempo(self.attrs.tempo))
    }
}

/// Total musical length of tied note values. Every value must last at
/// least one tick.
fn beats(length: &Length) -> Result<Beat, EvalError> {
    length.values.iter().try_fold(Beat::ZERO, |total, v| {
        Beat::from_note_value(v.denominator, v.dots)
            .map(|b| total + b)
            .ok_or(EvalError::InvalidLength(v.denominator))
    })
}
