//! Stock instrument catalogue.
//!
//! Maps the instrument names a part declaration may use onto the synth
//! patch that plays them. Every name is also reachable with a `midi-`
//! prefix.

use crate::instrument::oscillator::Waveform;

/// Sound family used to render a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Patch {
    Keys,
    Organ,
    /// Slow-attack detuned saws for bowed strings and choirs.
    Pad,
    Bass,
    Lead(Waveform),
    Pluck,
    Percussion,
}

/// A stock instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub patch: Patch,
}

const fn entry(name: &'static str, patch: Patch) -> CatalogEntry {
    CatalogEntry { name, patch }
}

const CATALOG: &[CatalogEntry] = &[
    // Keyboards
    entry("piano", Patch::Keys),
    entry("acoustic-grand-piano", Patch::Keys),
    entry("bright-acoustic-piano", Patch::Keys),
    entry("electric-piano", Patch::Keys),
    entry("celesta", Patch::Keys),
    entry("glockenspiel", Patch::Keys),
    entry("vibraphone", Patch::Keys),
    entry("harpsichord", Patch::Pluck),
    entry("marimba", Patch::Pluck),
    entry("organ", Patch::Organ),
    entry("church-organ", Patch::Organ),
    entry("accordion", Patch::Organ),
    // Strings
    entry("violin", Patch::Pad),
    entry("viola", Patch::Pad),
    entry("cello", Patch::Pad),
    entry("contrabass", Patch::Pad),
    entry("string-ensemble", Patch::Pad),
    entry("choir", Patch::Pad),
    entry("harp", Patch::Pluck),
    entry("guitar", Patch::Pluck),
    entry("acoustic-guitar", Patch::Pluck),
    entry("electric-guitar", Patch::Pluck),
    entry("banjo", Patch::Pluck),
    // Bass
    entry("bass", Patch::Bass),
    entry("acoustic-bass", Patch::Bass),
    entry("electric-bass", Patch::Bass),
    entry("synth-bass", Patch::Bass),
    // Winds and brass
    entry("flute", Patch::Lead(Waveform::Sine)),
    entry("piccolo", Patch::Lead(Waveform::Sine)),
    entry("recorder", Patch::Lead(Waveform::Sine)),
    entry("clarinet", Patch::Lead(Waveform::Square)),
    entry("oboe", Patch::Lead(Waveform::Triangle)),
    entry("bassoon", Patch::Lead(Waveform::Triangle)),
    entry("saxophone", Patch::Lead(Waveform::Saw)),
    entry("trumpet", Patch::Lead(Waveform::Saw)),
    entry("trombone", Patch::Lead(Waveform::Saw)),
    entry("french-horn", Patch::Lead(Waveform::Triangle)),
    entry("tuba", Patch::Lead(Waveform::Triangle)),
    // Raw waveforms
    entry("sine-wave", Patch::Lead(Waveform::Sine)),
    entry("square-wave", Patch::Lead(Waveform::Square)),
    entry("sawtooth-wave", Patch::Lead(Waveform::Saw)),
    entry("triangle-wave", Patch::Lead(Waveform::Triangle)),
    // Drums
    entry("percussion", Patch::Percussion),
    entry("drums", Patch::Percussion),
];

/// Look up a stock instrument by name, accepting a `midi-` prefix.
pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    let bare = name.strip_prefix("midi-").unwrap_or(name);
    CATALOG.iter().find(|e| e.name == bare)
}

/// All stock instrument names, in catalogue order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|e| e.name)
}
