//! Lexer for the score notation.
//!
//! Converts source text into a stream of [`Token`]s. Notes, rests, octave
//! settings and voice markers are recognised from whole words so that names
//! like `acoustic-bass` are never split into a note and a flat sign.

use super::error::CompileError;
use super::token::{LengthToken, NoteToken, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let ch = self.peek();
            let token = match ch {
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '[' => self.single_char(TokenKind::LBracket),
                ']' => self.single_char(TokenKind::RBracket),
                '/' => self.single_char(TokenKind::Slash),
                ':' => self.single_char(TokenKind::Colon),
                '|' => self.single_char(TokenKind::Barline),
                '>' => self.single_char(TokenKind::OctaveUp),
                '<' => self.single_char(TokenKind::OctaveDown),
                '"' => self.lex_string()?,
                '*' => self.lex_repeat()?,
                '0'..='9' => self.lex_number()?,
                'a'..='z' | 'A'..='Z' => self.lex_word()?,
                _ => {
                    return Err(CompileError::lex(
                        format!("unexpected character: '{ch}'"),
                        self.line,
                        self.col,
                    ));
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    fn lex_string(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening '"'
        let mut s = String::new();
        while !self.is_at_end() && self.peek() != '"' {
            s.push(self.advance());
        }
        if self.is_at_end() {
            return Err(CompileError::lex("unclosed string literal", line, col));
        }
        self.advance(); // closing '"'
        Ok(Token {
            kind: TokenKind::Str(s),
            line,
            col,
        })
    }

    fn lex_repeat(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // '*'
        let digits = self.take_digits();
        let times: u32 = digits
            .parse()
            .map_err(|_| CompileError::lex("expected repeat count after '*'", line, col))?;
        Ok(Token {
            kind: TokenKind::Repeat(times),
            line,
            col,
        })
    }

    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;
        let mut s = self.take_digits();

        if !self.is_at_end()
            && self.peek() == '.'
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            s.push(self.advance());
            s.push_str(&self.take_digits());
        }

        let val: f64 = s
            .parse()
            .map_err(|_| CompileError::lex(format!("invalid number: {s}"), line, col))?;
        Ok(Token {
            kind: TokenKind::Number(val),
            line,
            col,
        })
    }

    fn take_digits(&mut self) -> String {
        let mut s = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance());
        }
        s
    }

    /// Lex a word and classify it as a note, rest, octave, voice marker or
    /// plain identifier.
    fn lex_word(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;
        let mut word = String::new();

        while !self.is_at_end() && is_word_char(self.peek()) {
            word.push(self.advance());
        }

        // V1: is a voice marker, colon included.
        if let Some(n) = voice_number(&word) {
            if !self.is_at_end() && self.peek() == ':' {
                self.advance();
                return Ok(Token {
                    kind: TokenKind::Voice(n),
                    line,
                    col,
                });
            }
        }

        if let Some(kind) =
            classify_music_word(&word).map_err(|msg| CompileError::lex(msg, line, col))?
        {
            return Ok(Token { kind, line, col });
        }

        if word.contains(|c| c == '.' || c == '~') {
            return Err(CompileError::lex(
                format!("malformed note or length: '{word}'"),
                line,
                col,
            ));
        }

        Ok(Token {
            kind: TokenKind::Ident(word),
            line,
            col,
        })
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '+' | '\'' | '!' | '.' | '~')
}

fn voice_number(word: &str) -> Option<u32> {
    let digits = word.strip_prefix('V')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Most sharps or flats a single note may carry.
const MAX_ACCIDENTALS: i8 = 12;

/// Recognise `c+4.~8`, `r8`, `o3`. Anything else is not a music word.
fn classify_music_word(word: &str) -> Result<Option<TokenKind>, String> {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return Ok(None);
    };
    let rest: &str = chars.as_str();

    let kind = match first {
        'a'..='g' => {
            let mut accidentals: i8 = 0;
            let mut idx = 0;
            for ch in rest.chars() {
                match ch {
                    '+' => accidentals += 1,
                    '-' => accidentals -= 1,
                    '_' => {}
                    _ => break,
                }
                if accidentals.abs() > MAX_ACCIDENTALS {
                    return Err(format!(
                        "too many accidentals in '{word}' (at most {MAX_ACCIDENTALS})"
                    ));
                }
                idx += ch.len_utf8();
            }
            parse_length(&rest[idx..]).map(|length| {
                TokenKind::Note(NoteToken {
                    letter: first,
                    accidentals,
                    length,
                })
            })
        }
        'r' => parse_length(rest).map(TokenKind::Rest),
        'o' => {
            if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
                return Ok(None);
            }
            let octave: u32 = rest
                .parse()
                .map_err(|_| format!("octave out of range: '{word}'"))?;
            Some(TokenKind::OctaveSet(octave))
        }
        _ => None,
    };
    Ok(kind)
}

/// Parse an optional length suffix. `Some(None)` means no length was given;
/// `None` means the suffix is not a valid length.
fn parse_length(s: &str) -> Option<Option<LengthToken>> {
    if s.is_empty() {
        return Some(None);
    }

    let mut values = Vec::new();
    for part in s.split('~') {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let tail = &part[digits.len()..];
        if !tail.chars().all(|c| c == '.') {
            return None;
        }
        let value: u32 = digits.parse().ok()?;
        values.push((value, tail.len() as u32));
    }

    Some(Some(LengthToken { values }))
}
