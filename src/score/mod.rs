//! Score builder — applies parsed forms to a persistent, growing score.
//!
//! [`ScoreBuilder`] holds everything evaluation needs between lines: the
//! parts created so far, their attributes and positions, the nickname table
//! and the currently selected parts. [`Score`] is an immutable snapshot of
//! the result.

pub mod catalog;
pub mod error;
pub mod part;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::dsl::ast::{AttributeForm, Form, PartDecl};
use crate::dsl::EntryPoint;
use crate::event::{Offset, PartId, SoundingEvent};

pub use catalog::Patch;
pub use error::EvalError;
pub use part::{Attributes, PartInfo};

use catalog::CatalogEntry;
use part::PartState;

/// A snapshot of the score: every sounding event plus the part table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    events: BTreeSet<SoundingEvent>,
    parts: BTreeMap<PartId, PartInfo>,
}

impl Score {
    pub fn new(events: BTreeSet<SoundingEvent>, parts: BTreeMap<PartId, PartInfo>) -> Self {
        Self { events, parts }
    }

    pub fn events(&self) -> &BTreeSet<SoundingEvent> {
        &self.events
    }

    pub fn parts(&self) -> &BTreeMap<PartId, PartInfo> {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&PartInfo> {
        self.parts.get(&id)
    }

    /// Number of sounding events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events played by `part`.
    pub fn event_count(&self, part: PartId) -> usize {
        self.events.iter().filter(|e| e.part == part).count()
    }

    /// When the last note stops sounding.
    pub fn end(&self) -> Offset {
        self.events
            .iter()
            .map(|e| e.offset + e.duration)
            .max()
            .unwrap_or(Offset::ZERO)
    }
}

/// Most notes, rests and other forms one line may expand to once repeats
/// are unrolled.
pub const MAX_EXPANDED_FORMS: u64 = 100_000;

/// Mutable score-building state carried across lines.
#[derive(Debug, Clone, Default)]
pub struct ScoreBuilder {
    /// Indexed by `PartId`.
    parts: Vec<PartState>,
    /// Unaliased stock instruments, keyed by canonical name.
    stock: HashMap<&'static str, PartId>,
    /// Aliases and group nicknames.
    nicknames: HashMap<String, Vec<PartId>>,
    current: Vec<PartId>,
    /// Attributes given to newly created parts.
    defaults: Attributes,
    events: BTreeSet<SoundingEvent>,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `forms`, parsed from `entry`, to the score.
    ///
    /// Music data continues whatever parts are open. A score starts from no
    /// selected parts, so its leading attributes apply globally. The forms
    /// are applied to a copy that replaces `self` only if all of them
    /// succeed; on error the builder is unchanged.
    pub fn evaluate(&mut self, entry: EntryPoint, forms: &[Form]) -> Result<(), EvalError> {
        let expanded = expanded_len(forms);
        if expanded > MAX_EXPANDED_FORMS {
            return Err(EvalError::TooLarge {
                limit: MAX_EXPANDED_FORMS,
            });
        }
        debug!(
            "evaluating {} form(s), {expanded} expanded, as {}",
            forms.len(),
            entry.name()
        );

        let mut scratch = self.clone();
        scratch.apply_line(entry, forms)?;
        *self = scratch;
        Ok(())
    }

    fn apply_line(&mut self, entry: EntryPoint, forms: &[Form]) -> Result<(), EvalError> {
        match entry {
            EntryPoint::MusicData => {
                if self.current.is_empty() {
                    return Err(EvalError::NoActivePart);
                }
            }
            EntryPoint::Part => {}
            EntryPoint::Score => self.select(Vec::new()),
        }
        self.apply_all(forms)
    }

    /// Snapshot the current score.
    pub fn snapshot(&self) -> Score {
        Score {
            events: self.events.clone(),
            parts: self
                .parts
                .iter()
                .map(|p| (p.id, p.info.clone()))
                .collect(),
        }
    }

    /// Display names of the selected parts.
    pub fn current_part_names(&self) -> Vec<&str> {
        self.current
            .iter()
            .filter_map(|id| self.parts.get(id.0 as usize))
            .map(|p| p.info.name.as_str())
            .collect()
    }

    fn apply_all(&mut self, forms: &[Form]) -> Result<(), EvalError> {
        forms.iter().try_for_each(|form| self.apply(form))
    }

    fn apply(&mut self, form: &Form) -> Result<(), EvalError> {
        match form {
            Form::Part(decl) => self.declare(decl),
            Form::Attribute(attr) if attr.global || self.current.is_empty() => {
                self.set_global(attr)
            }
            Form::Sequence(forms) => self.apply_all(forms),
            Form::Repeat { form, times } => {
                for _ in 0..*times {
                    self.apply(form)?;
                }
                Ok(())
            }
            _ => {
                if self.current.is_empty() {
                    return Err(EvalError::NoActivePart);
                }
                for id in self.current.clone() {
                    self.apply_to_part(id, form)?;
                }
                Ok(())
            }
        }
    }

    fn apply_to_part(&mut self, id: PartId, form: &Form) -> Result<(), EvalError> {
        let Some(part) = self.parts.get_mut(id.0 as usize) else {
            return Ok(());
        };
        match form {
            Form::Note(note) => {
                self.events.insert(part.note(note)?);
            }
            Form::Rest(length) => part.rest(length.as_ref())?,
            Form::Chord(members) => self.events.extend(part.chord(members)?),
            Form::Octave(change) => part.octave(*change)?,
            Form::Attribute(attr) => part.attrs.set(&attr.name, attr.value)?,
            Form::Voice(n) => part.voice(*n),
            Form::Part(_) | Form::Sequence(_) | Form::Repeat { .. } => {}
        }
        Ok(())
    }

    /// Update the defaults for new parts and every existing part.
    fn set_global(&mut self, attr: &AttributeForm) -> Result<(), EvalError> {
        self.defaults.set(&attr.name, attr.value)?;
        for part in &mut self.parts {
            part.attrs.set(&attr.name, attr.value)?;
        }
        debug!("global {} = {}", attr.name, attr.value);
        Ok(())
    }

    fn declare(&mut self, decl: &PartDecl) -> Result<(), EvalError> {
        let ids = match (decl.names.as_slice(), decl.alias.as_deref()) {
            ([name], Some(alias)) => vec![self.aliased_part(name, alias)?],
            (names, alias) => {
                let mut ids = Vec::new();
                for name in names {
                    ids.extend(self.resolve_name(name)?);
                }
                if let Some(alias) = alias {
                    self.register_nickname(alias, &ids)?;
                }
                ids
            }
        };
        self.select(ids);
        Ok(())
    }

    /// A nickname's parts, or the shared part of a stock instrument.
    fn resolve_name(&mut self, name: &str) -> Result<Vec<PartId>, EvalError> {
        if let Some(ids) = self.nicknames.get(name) {
            return Ok(ids.clone());
        }
        let entry = catalog::lookup(name)
            .ok_or_else(|| EvalError::UnknownInstrument(name.to_string()))?;
        if let Some(&id) = self.stock.get(entry.name) {
            return Ok(vec![id]);
        }
        let id = self.create_part(entry, entry.name);
        self.stock.insert(entry.name, id);
        Ok(vec![id])
    }

    /// `piano "right":` creates a new part reachable by its alias, or selects
    /// the part the alias already names if it is the same instrument.
    fn aliased_part(&mut self, name: &str, alias: &str) -> Result<PartId, EvalError> {
        let entry = catalog::lookup(name)
            .ok_or_else(|| EvalError::UnknownInstrument(name.to_string()))?;

        if let Some(ids) = self.nicknames.get(alias) {
            return match ids.as_slice() {
                [id] if self.parts[id.0 as usize].info.instrument == entry.name => Ok(*id),
                _ => Err(EvalError::AliasInUse(alias.to_string())),
            };
        }

        let id = self.create_part(entry, alias);
        self.nicknames.insert(alias.to_string(), vec![id]);
        Ok(id)
    }

    fn register_nickname(&mut self, alias: &str, ids: &[PartId]) -> Result<(), EvalError> {
        match self.nicknames.get(alias) {
            Some(existing) if existing.as_slice() != ids => {
                Err(EvalError::AliasInUse(alias.to_string()))
            }
            Some(_) => Ok(()),
            None => {
                self.nicknames.insert(alias.to_string(), ids.to_vec());
                Ok(())
            }
        }
    }

    fn create_part(&mut self, entry: &CatalogEntry, name: &str) -> PartId {
        let id = PartId(self.parts.len() as u32);
        let info = PartInfo {
            name: name.to_string(),
            instrument: entry.name.to_string(),
            patch: entry.patch,
        };
        debug!("new part {id} '{}' ({})", info.name, info.instrument);
        self.parts
            .push(PartState::new(id, info, self.defaults.clone()));
        id
    }

    /// Make `ids` the selected parts, closing voice groups on the old ones.
    fn select(&mut self, mut ids: Vec<PartId>) {
        for id in &self.current {
            if let Some(part) = self.parts.get_mut(id.0 as usize) {
                part.close_voices();
            }
        }
        let mut seen = BTreeSet::new();
        ids.retain(|id| seen.insert(*id));
        self.current = ids;
    }
}

/// How many forms `forms` runs once every repeat is unrolled.
fn expanded_len(forms: &[Form]) -> u64 {
    forms
        .iter()
        .fold(0u64, |total, form| total.saturating_add(form_len(form)))
}

fn form_len(form: &Form) -> u64 {
    match form {
        Form::Sequence(inner) => expanded_len(inner),
        Form::Repeat { form, times } => u64::from(*times).saturating_mul(form_len(form)),
        _ => 1,
    }
}
