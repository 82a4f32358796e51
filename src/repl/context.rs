//! Context resolver — picks the grammar entry point for each line.
//!
//! A fragment like `f g` is valid as music data and, wrapped differently,
//! could also be valid at higher levels. Entry points are tried from the most
//! local outwards and the first one that parses wins. The winner becomes the
//! session context, whatever happens to the line afterwards.

use std::fmt;

use log::debug;

use crate::dsl::{CompileError, EntryPoint, Form, Grammar};

/// The structural level the last successfully parsed line was read at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionContext {
    #[default]
    ScoreLevel,
    PartLevel,
    MusicDataLevel,
}

impl From<EntryPoint> for SessionContext {
    fn from(entry: EntryPoint) -> Self {
        match entry {
            EntryPoint::Score => SessionContext::ScoreLevel,
            EntryPoint::Part => SessionContext::PartLevel,
            EntryPoint::MusicData => SessionContext::MusicDataLevel,
        }
    }
}

impl SessionContext {
    pub fn entry_point(self) -> EntryPoint {
        match self {
            SessionContext::ScoreLevel => EntryPoint::Score,
            SessionContext::PartLevel => EntryPoint::Part,
            SessionContext::MusicDataLevel => EntryPoint::MusicData,
        }
    }
}

/// No entry point accepted the line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// One error per entry point, in the order they were tried.
    pub attempts: Vec<(EntryPoint, CompileError)>,
}

impl ParseFailure {
    /// The attempt that got furthest into the line before failing; on a
    /// tie, the one tried first.
    pub fn furthest(&self) -> Option<&(EntryPoint, CompileError)> {
        self.attempts.iter().fold(None, |best, attempt| match best {
            Some(b) if b.1.position() >= attempt.1.position() => Some(b),
            _ => Some(attempt),
        })
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.furthest() {
            Some((entry, err)) => write!(f, "syntax error (as {}): {err}", entry.name()),
            None => write!(f, "syntax error"),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Owns the grammar and the session context, which only it writes.
#[derive(Debug, Clone)]
pub struct ContextResolver<G> {
    grammar: G,
    context: SessionContext,
}

impl<G: Grammar> ContextResolver<G> {
    pub fn new(grammar: G) -> Self {
        Self {
            grammar,
            context: SessionContext::default(),
        }
    }

    pub fn context(&self) -> SessionContext {
        self.context
    }

    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    /// Back to the initial context.
    pub fn reset(&mut self) {
        self.context = SessionContext::default();
    }

    /// Parse `text` from the first entry point that accepts it, committing
    /// that entry point as the session context. On failure the context is
    /// left alone.
    pub fn resolve_and_parse(
        &mut self,
        text: &str,
    ) -> Result<(EntryPoint, Vec<Form>), ParseFailure> {
        let (entry, forms) = parse_first(&self.grammar, text, &EntryPoint::PRIORITY)?;
        debug!(
            "context {:?} -> {:?}",
            self.context,
            SessionContext::from(entry)
        );
        self.context = entry.into();
        Ok((entry, forms))
    }
}

/// Try `entries` in order and return the first successful parse.
pub fn parse_first<G: Grammar + ?Sized>(
    grammar: &G,
    text: &str,
    entries: &[EntryPoint],
) -> Result<(EntryPoint, Vec<Form>), ParseFailure> {
    let mut attempts = Vec::with_capacity(entries.len());
    for &entry in entries {
        match grammar.parse(text, entry) {
            Ok(forms) => return Ok((entry, forms)),
            Err(err) => attempts.push((entry, err)),
        }
    }
    Err(ParseFailure { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::NotationGrammar;
    use std::cell::RefCell;

    /// Accepts every entry point and records what it was asked.
    struct Permissive {
        calls: RefCell<Vec<EntryPoint>>,
    }

    impl Grammar for Permissive {
        fn parse(&self, _text: &str, entry: EntryPoint) -> Result<Vec<Form>, CompileError> {
            self.calls.borrow_mut().push(entry);
            Ok(Vec::new())
        }
    }

    #[test]
    fn initial_context_is_score_level() {
        let resolver = ContextResolver::new(NotationGrammar);
        assert_eq!(resolver.context(), SessionContext::ScoreLevel);
    }

    #[test]
    fn most_local_entry_point_wins() {
        let mut resolver = ContextResolver::new(Permissive {
            calls: RefCell::new(Vec::new()),
        });
        let (entry, _) = resolver.resolve_and_parse("anything").unwrap();
        assert_eq!(entry, EntryPoint::MusicData);
        assert_eq!(resolver.context(), SessionContext::MusicDataLevel);
        assert_eq!(
            *resolver.grammar().calls.borrow(),
            vec![EntryPoint::MusicData]
        );
    }

    #[test]
    fn falls_through_to_part() {
        let mut resolver = ContextResolver::new(NotationGrammar);
        let (entry, forms) = resolver.resolve_and_parse("piano: c d e").unwrap();
        assert_eq!(entry, EntryPoint::Part);
        assert_eq!(forms.len(), 4);
        assert_eq!(resolver.context(), SessionContext::PartLevel);
    }

    #[test]
    fn falls_through_to_score() {
        let mut resolver = ContextResolver::new(NotationGrammar);
        let (entry, _) = resolver.resolve_and_parse("piano: c violin: d").unwrap();
        assert_eq!(entry, EntryPoint::Score);
        assert_eq!(resolver.context(), SessionContext::ScoreLevel);
    }

    #[test]
    fn context_overwritten_each_success() {
        let mut resolver = ContextResolver::new(NotationGrammar);
        resolver.resolve_and_parse("piano: c").unwrap();
        resolver.resolve_and_parse("d e").unwrap();
        assert_eq!(resolver.context(), SessionContext::MusicDataLevel);
        resolver.resolve_and_parse("violin: c").unwrap();
        assert_eq!(resolver.context(), SessionContext::PartLevel);
    }

    #[test]
    fn failure_leaves_context_alone() {
        let mut resolver = ContextResolver::new(NotationGrammar);
        resolver.resolve_and_parse("piano: c").unwrap();
        let failure = resolver.resolve_and_parse("piano: q").unwrap_err();
        assert_eq!(resolver.context(), SessionContext::PartLevel);
        assert_eq!(failure.attempts.len(), 3);
        let order: Vec<EntryPoint> = failure.attempts.iter().map(|(e, _)| *e).collect();
        assert_eq!(order, EntryPoint::PRIORITY.to_vec());
    }

    #[test]
    fn failure_reports_furthest_attempt() {
        let mut resolver = ContextResolver::new(NotationGrammar);
        let failure = resolver.resolve_and_parse("piano: q").unwrap_err();
        let (entry, err) = failure.furthest().unwrap();
        assert_eq!(err.col, 8);
        assert_eq!(*entry, EntryPoint::Part);
        assert!(failure.to_string().starts_with("syntax error (as part)"));
    }

    #[test]
    fn empty_failure_displays_plainly() {
        let failure = ParseFailure {
            attempts: Vec::new(),
        };
        assert!(failure.furthest().is_none());
        assert_eq!(failure.to_string(), "syntax error");
    }

    #[test]
    fn entry_point_round_trip() {
        for entry in EntryPoint::PRIORITY {
            assert_eq!(SessionContext::from(entry).entry_point(), entry);
        }
    }
}
