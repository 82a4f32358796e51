//! Score notation grammar: source text → tokens → [`Form`]s.
//!
//! A line of notation can be read from three entry points, each a distinct
//! top-level production. The session decides which ones to try.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod note;
pub mod parser;
pub mod token;

pub use ast::*;
pub use error::CompileError;

use lexer::Lexer;
use parser::Parser;

/// A top-level production of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Notes, rests, attributes and so on, without a part declaration.
    MusicData,
    /// Exactly one part declaration followed by its music.
    Part,
    /// Optional leading attributes and one or more parts.
    Score,
}

impl EntryPoint {
    /// Entry points in the order a line is tried against them.
    pub const PRIORITY: [EntryPoint; 3] =
        [EntryPoint::MusicData, EntryPoint::Part, EntryPoint::Score];

    pub fn name(self) -> &'static str {
        match self {
            EntryPoint::MusicData => "music data",
            EntryPoint::Part => "part",
            EntryPoint::Score => "score",
        }
    }
}

/// Parses text from a named entry point into score-building forms.
pub trait Grammar {
    fn parse(&self, text: &str, entry: EntryPoint) -> Result<Vec<Form>, CompileError>;
}

/// The built-in notation grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotationGrammar;

impl Grammar for NotationGrammar {
    fn parse(&self, text: &str, entry: EntryPoint) -> Result<Vec<Form>, CompileError> {
        let tokens = Lexer::new(text).tokenize()?;
        Parser::new(tokens).parse(entry)
    }
}
