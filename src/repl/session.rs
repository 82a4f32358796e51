//! A live score session.
//!
//! Each line goes through resolve → evaluate → diff → normalize → dispatch.
//! The session context is committed as soon as a line parses; the score is
//! committed only once the whole line evaluates.

use log::{debug, info};
use thiserror::Error;

use crate::audio::AudioError;
use crate::dsl::{EntryPoint, Grammar, NotationGrammar};
use crate::event::SoundingEvent;
use crate::score::{EvalError, Score, ScoreBuilder};

use super::context::{ContextResolver, ParseFailure, SessionContext};
use super::diff::new_events;
use super::dispatch::{dispatch, AudioSink, PlayOptions, PlaybackScore};
use super::normalize::normalize;

/// Why a turn failed.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvalError),

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
}

/// What a successfully evaluated line added.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub entry: EntryPoint,
    /// New events at their positions in the full score.
    pub added: Vec<SoundingEvent>,
}

/// A completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub entry: EntryPoint,
    pub added: Vec<SoundingEvent>,
    /// What was handed to the audio side, starting at zero.
    pub playback: PlaybackScore,
}

/// All state that lives across lines.
pub struct Session<G = NotationGrammar> {
    resolver: ContextResolver<G>,
    builder: ScoreBuilder,
    snapshot: Score,
    /// Lines that evaluated successfully, in order.
    history: Vec<String>,
}

impl Default for Session<NotationGrammar> {
    fn default() -> Self {
        Self::new(NotationGrammar)
    }
}

impl<G: Grammar> Session<G> {
    pub fn new(grammar: G) -> Self {
        Self {
            resolver: ContextResolver::new(grammar),
            builder: ScoreBuilder::new(),
            snapshot: Score::default(),
            history: Vec::new(),
        }
    }

    pub fn context(&self) -> SessionContext {
        self.resolver.context()
    }

    pub fn current_score_snapshot(&self) -> &Score {
        &self.snapshot
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Display names of the parts new music data would go to.
    pub fn part_names(&self) -> Vec<&str> {
        self.builder.current_part_names()
    }

    /// Forget everything and start a fresh score.
    pub fn reset(&mut self) {
        self.resolver.reset();
        self.builder = ScoreBuilder::new();
        self.snapshot = Score::default();
        self.history.clear();
        info!("session reset");
    }

    /// Parse, evaluate and diff one line without playing it.
    ///
    /// Blank and comment-only lines are skipped and return `Ok(None)`.
    pub fn evaluate_line(&mut self, line: &str) -> Result<Option<Evaluated>, TurnError> {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let (entry, forms) = self.resolver.resolve_and_parse(text)?;

        self.builder.evaluate(entry, &forms)?;
        let snapshot = self.builder.snapshot();
        let added = new_events(&self.snapshot, &snapshot);
        debug!(
            "{} new event(s); score now has {}",
            added.len(),
            snapshot.len()
        );

        self.snapshot = snapshot;
        self.history.push(text.to_string());
        Ok(Some(Evaluated { entry, added }))
    }

    /// Run a full turn: evaluate `line` and play what it added.
    pub fn turn<S: AudioSink + ?Sized>(
        &mut self,
        line: &str,
        sink: &mut S,
        options: &PlayOptions,
    ) -> Result<Option<TurnOutcome>, TurnError> {
        let Some(Evaluated { entry, added }) = self.evaluate_line(line)? else {
            return Ok(None);
        };
        let playback = dispatch(sink, normalize(&added), &self.snapshot, options)?;
        Ok(Some(TurnOutcome {
            entry,
            added,
            playback,
        }))
    }

    /// Play the whole score from its first note.
    pub fn replay<S: AudioSink + ?Sized>(
        &self,
        sink: &mut S,
        options: &PlayOptions,
    ) -> Result<PlaybackScore, AudioError> {
        let all: Vec<SoundingEvent> = self.snapshot.events().iter().cloned().collect();
        dispatch(sink, normalize(&all), &self.snapshot, options)
    }
}
