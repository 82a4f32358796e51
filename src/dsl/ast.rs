//! Score-building forms produced by the parser.
//!
//! Every entry point parses into a flat `Vec<Form>`; nesting only appears
//! inside sequences and repeats.

/// A single score-building form.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// Switch to (and possibly create) a part or group of parts.
    Part(PartDecl),
    Note(NoteForm),
    Rest(Option<Length>),
    /// Notes and rests that start together.
    Chord(Vec<ChordMember>),
    Octave(OctaveChange),
    Attribute(AttributeForm),
    /// Start voice `n` of a voice group; 0 closes the group.
    Voice(u32),
    Sequence(Vec<Form>),
    Repeat { form: Box<Form>, times: u32 },
}

/// `violin/viola "strings":`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDecl {
    pub names: Vec<String>,
    pub alias: Option<String>,
}

/// A note letter, net accidentals and an optional explicit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub letter: char,
    pub accidentals: i8,
    pub length: Option<Length>,
}

/// Tied note values, each with its dot count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Length {
    pub values: Vec<NoteValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteValue {
    /// 4 = quarter, 8 = eighth, 1 = whole, 3 = triplet half…
    pub denominator: u32,
    pub dots: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordMember {
    Note(NoteForm),
    Rest(Option<Length>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OctaveChange {
    Set(u32),
    Up,
    Down,
}

/// `(tempo 90)` or, with `global`, `(tempo! 90)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeForm {
    pub name: String,
    pub value: f64,
    pub global: bool,
}
