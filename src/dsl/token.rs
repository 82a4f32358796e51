//! Token types for the score notation lexer.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Music
    Note(NoteToken),
    Rest(Option<LengthToken>),
    OctaveSet(u32),
    OctaveUp,
    OctaveDown,
    /// `V1:`; the colon is part of the token.
    Voice(u32),
    Barline,
    Repeat(u32),

    // Literals
    Ident(String),
    Str(String),
    Number(f64),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Slash,
    Colon,

    // Special
    Eof,
}

/// A note letter with accidentals and an optional length.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteToken {
    pub letter: char,
    /// Net semitone shift: `+` is +1, `-` is -1, `_` is 0.
    pub accidentals: i8,
    pub length: Option<LengthToken>,
}

/// One or more tied note values: `4.~8` is `[(4, 1), (8, 0)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthToken {
    /// `(note value, dots)` pairs joined by ties.
    pub values: Vec<(u32, u32)>,
}
