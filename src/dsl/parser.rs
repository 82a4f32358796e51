//! Parser for the score notation.
//!
//! Parses a token stream into [`Form`]s starting from one of three entry
//! points. The same event grammar is shared by all of them; they differ only
//! in how part declarations may appear.

use super::ast::*;
use super::error::CompileError;
use super::token::{LengthToken, NoteToken, Token, TokenKind};
use super::EntryPoint;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream from `entry`.
    pub fn parse(&mut self, entry: EntryPoint) -> Result<Vec<Form>, CompileError> {
        let forms = match entry {
            EntryPoint::MusicData => self.parse_music_data()?,
            EntryPoint::Part => self.parse_part()?,
            EntryPoint::Score => self.parse_score()?,
        };
        self.expect_end()?;
        Ok(forms)
    }

    /// One or more music events, no part declarations.
    fn parse_music_data(&mut self) -> Result<Vec<Form>, CompileError> {
        let start = self.peek().clone();
        let forms = self.parse_events(false)?;
        if forms.is_empty() {
            return Err(CompileError::parse(
                "expected music data",
                start.line,
                start.col,
            ));
        }
        Ok(forms)
    }

    /// Exactly one part declaration followed by its music.
    fn parse_part(&mut self) -> Result<Vec<Form>, CompileError> {
        let decl = self.parse_part_decl()?;
        let mut forms = vec![Form::Part(decl)];
        forms.extend(self.parse_events(false)?);
        Ok(forms)
    }

    /// Leading attributes, then one or more parts.
    fn parse_score(&mut self) -> Result<Vec<Form>, CompileError> {
        let mut forms = Vec::new();

        while self.check(TokenKind::LParen) {
            forms.push(Form::Attribute(self.parse_attribute()?));
        }

        if !self.starts_part_decl() {
            let t = self.peek();
            return Err(CompileError::parse(
                format!("expected part declaration, got {}", describe(&t.kind)),
                t.line,
                t.col,
            ));
        }

        while !self.is_at_end() {
            let decl = self.parse_part_decl()?;
            forms.push(Form::Part(decl));
            forms.extend(self.parse_events(true)?);
        }

        Ok(forms)
    }

    /// `name(/name)* "alias"? :`
    fn parse_part_decl(&mut self) -> Result<PartDecl, CompileError> {
        let mut names = vec![self.expect_part_name()?];
        while self.check(TokenKind::Slash) {
            self.advance();
            names.push(self.expect_part_name()?);
        }

        let alias = match &self.peek().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Some(s)
            }
            _ => None,
        };

        self.expect(TokenKind::Colon)?;
        Ok(PartDecl { names, alias })
    }

    fn expect_part_name(&mut self) -> Result<String, CompileError> {
        let t = self.peek().clone();
        match &t.kind {
            TokenKind::Ident(name) if is_part_name(name) => {
                self.advance();
                Ok(name.clone())
            }
            TokenKind::Ident(name) => Err(CompileError::parse(
                format!("'{name}' is not a valid part name"),
                t.line,
                t.col,
            )),
            _ => Err(CompileError::parse(
                format!("expected part name, got {}", describe(&t.kind)),
                t.line,
                t.col,
            )),
        }
    }

    /// Parse events until end of input, a closing bracket, or (when
    /// `stop_at_part` is set) the start of another part declaration.
    fn parse_events(&mut self, stop_at_part: bool) -> Result<Vec<Form>, CompileError> {
        let mut forms = Vec::new();
        loop {
            if self.is_at_end() || self.check(TokenKind::RBracket) {
                break;
            }
            if stop_at_part && self.starts_part_decl() {
                break;
            }
            if let Some(form) = self.parse_event()? {
                forms.push(form);
            }
        }
        Ok(forms)
    }

    fn parse_event(&mut self) -> Result<Option<Form>, CompileError> {
        let t = self.peek().clone();
        let form = match &t.kind {
            TokenKind::Note(_) | TokenKind::Rest(_) => {
                let form = self.parse_note_or_chord()?;
                self.parse_repeat(form)
            }
            TokenKind::OctaveSet(n) => {
                let n = *n;
                self.advance();
                Form::Octave(OctaveChange::Set(n))
            }
            TokenKind::OctaveUp => {
                self.advance();
                Form::Octave(OctaveChange::Up)
            }
            TokenKind::OctaveDown => {
                self.advance();
                Form::Octave(OctaveChange::Down)
            }
            TokenKind::LParen => Form::Attribute(self.parse_attribute()?),
            TokenKind::Voice(n) => {
                let n = *n;
                self.advance();
                Form::Voice(n)
            }
            TokenKind::LBracket => {
                self.advance();
                let inner = self.parse_events(false)?;
                self.expect(TokenKind::RBracket)?;
                self.parse_repeat(Form::Sequence(inner))
            }
            TokenKind::Barline => {
                self.advance();
                return Ok(None);
            }
            TokenKind::Repeat(_) => {
                return Err(CompileError::parse(
                    "repeat without a preceding event",
                    t.line,
                    t.col,
                ));
            }
            other => {
                return Err(CompileError::parse(
                    format!("unexpected {}", describe(other)),
                    t.line,
                    t.col,
                ));
            }
        };
        Ok(Some(form))
    }

    /// A note or rest, or several joined by `/` into a chord.
    fn parse_note_or_chord(&mut self) -> Result<Form, CompileError> {
        let first = self.parse_chord_member()?;
        if !self.check(TokenKind::Slash) {
            return Ok(match first {
                ChordMember::Note(n) => Form::Note(n),
                ChordMember::Rest(l) => Form::Rest(l),
            });
        }

        let mut members = vec![first];
        while self.check(TokenKind::Slash) {
            self.advance();
            members.push(self.parse_chord_member()?);
        }
        Ok(Form::Chord(members))
    }

    fn parse_chord_member(&mut self) -> Result<ChordMember, CompileError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Note(note) => {
                self.advance();
                Ok(ChordMember::Note(note_form(note)))
            }
            TokenKind::Rest(length) => {
                self.advance();
                Ok(ChordMember::Rest(length.map(length_form)))
            }
            other => Err(CompileError::parse(
                format!("expected note or rest, got {}", describe(&other)),
                t.line,
                t.col,
            )),
        }
    }

    fn parse_repeat(&mut self, form: Form) -> Form {
        if let TokenKind::Repeat(times) = self.peek().kind {
            self.advance();
            Form::Repeat {
                form: Box::new(form),
                times,
            }
        } else {
            form
        }
    }

    /// `(name value)`; a trailing `!` on the name marks it global.
    fn parse_attribute(&mut self) -> Result<AttributeForm, CompileError> {
        self.expect(TokenKind::LParen)?;
        let t = self.peek().clone();
        let raw = match &t.kind {
            TokenKind::Ident(name) => name.clone(),
            other => {
                return Err(CompileError::parse(
                    format!("expected attribute name, got {}", describe(other)),
                    t.line,
                    t.col,
                ));
            }
        };
        self.advance();

        let value = self.expect_number()?;
        self.expect(TokenKind::RParen)?;

        let (name, global) = match raw.strip_suffix('!') {
            Some(name) => (name.to_string(), true),
            None => (raw, false),
        };

        Ok(AttributeForm {
            name,
            value,
            global,
        })
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end()
            && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    /// An identifier always begins a part declaration: music events never
    /// start with one.
    fn starts_part_decl(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), CompileError> {
        if std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind) {
            self.advance();
            Ok(())
        } else {
            let t = self.peek();
            Err(CompileError::parse(
                format!("expected {}, got {}", describe(&kind), describe(&t.kind)),
                t.line,
                t.col,
            ))
        }
    }

    fn expect_number(&mut self) -> Result<f64, CompileError> {
        let t = self.peek();
        match &t.kind {
            TokenKind::Number(v) => {
                let val = *v;
                self.advance();
                Ok(val)
            }
            other => Err(CompileError::parse(
                format!("expected number, got {}", describe(other)),
                t.line,
                t.col,
            )),
        }
    }

    fn expect_end(&self) -> Result<(), CompileError> {
        if self.is_at_end() {
            Ok(())
        } else {
            let t = self.peek();
            Err(CompileError::parse(
                format!("unexpected {}", describe(&t.kind)),
                t.line,
                t.col,
            ))
        }
    }
}

/// Part names start with two letters: `piano`, `midi-trumpet`, `Violin'`.
fn is_part_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_ascii_alphabetic() && b.is_ascii_alphabetic()
    )
}

fn note_form(note: NoteToken) -> NoteForm {
    NoteForm {
        letter: note.letter,
        accidentals: note.accidentals,
        length: note.length.map(length_form),
    }
}

fn length_form(length: LengthToken) -> Length {
    Length {
        values: length
            .values
            .into_iter()
            .map(|(denominator, dots)| NoteValue { denominator, dots })
            .collect(),
    }
}

/// Human-readable token description for error messages.
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Note(n) => format!("note '{}'", n.letter),
        TokenKind::Rest(_) => "rest".to_string(),
        TokenKind::OctaveSet(n) => format!("octave 'o{n}'"),
        TokenKind::OctaveUp => "'>'".to_string(),
        TokenKind::OctaveDown => "'<'".to_string(),
        TokenKind::Voice(n) => format!("voice 'V{n}:'"),
        TokenKind::Barline => "'|'".to_string(),
        TokenKind::Repeat(n) => format!("repeat '*{n}'"),
        TokenKind::Ident(s) => format!("identifier '{s}'"),
        TokenKind::Str(s) => format!("string \"{s}\""),
        TokenKind::Number(v) => format!("number {v}"),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Slash => "'/'".to_string(),
        TokenKind::Colon => "':'".to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}
