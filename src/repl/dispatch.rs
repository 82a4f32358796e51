//! Playback dispatcher — hands freshly added material to the audio side.
//!
//! The events played here are a one-off copy, shifted to start at zero. The
//! retained score snapshot is never touched.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;

use crate::audio::AudioError;
use crate::event::{Offset, PartId, SoundingEvent};
use crate::score::{PartInfo, Score};

/// A transient score built for a single playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackScore {
    events: Vec<SoundingEvent>,
    parts: BTreeMap<PartId, PartInfo>,
}

impl PlaybackScore {
    /// Wrap `events`, copying the entries of `snapshot`'s part table that
    /// they refer to.
    pub fn new(events: Vec<SoundingEvent>, snapshot: &Score) -> Self {
        let parts = events
            .iter()
            .filter_map(|e| snapshot.part(e.part).map(|info| (e.part, info.clone())))
            .collect();
        Self { events, parts }
    }

    pub fn events(&self) -> &[SoundingEvent] {
        &self.events
    }

    pub fn parts(&self) -> &BTreeMap<PartId, PartInfo> {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// When the last note stops sounding.
    pub fn duration(&self) -> Offset {
        self.events
            .iter()
            .map(|e| e.offset + e.duration)
            .max()
            .unwrap_or(Offset::ZERO)
    }
}

/// Where rendered audio goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayTarget {
    /// The default output device.
    #[default]
    Live,
    /// A numbered WAV file per playback in this directory.
    Wav(PathBuf),
    /// Render nothing.
    Silent,
}

/// Caller-supplied settings for one playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayOptions {
    pub target: PlayTarget,
    /// Load instruments for any newly referenced parts before rendering.
    pub load_instruments: bool,
    /// Master gain, 0.0–1.0.
    pub volume: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            target: PlayTarget::Live,
            load_instruments: true,
            volume: 1.0,
        }
    }
}

impl PlayOptions {
    pub fn silent() -> Self {
        Self {
            target: PlayTarget::Silent,
            ..Self::default()
        }
    }
}

/// The audio collaborator.
pub trait AudioSink {
    /// Prepare instruments for every part `score` refers to.
    fn load_instruments(&mut self, score: &PlaybackScore) -> Result<(), AudioError>;

    /// Render `score` from its start.
    fn render(&mut self, score: &PlaybackScore, options: &PlayOptions) -> Result<(), AudioError>;
}

/// Wrap already-normalized `events` and play them through `sink`.
pub fn dispatch<S: AudioSink + ?Sized>(
    sink: &mut S,
    events: Vec<SoundingEvent>,
    snapshot: &Score,
    options: &PlayOptions,
) -> Result<PlaybackScore, AudioError> {
    let playback = PlaybackScore::new(events, snapshot);
    debug!(
        "dispatching {} event(s) over {} to {:?}",
        playback.len(),
        playback.duration(),
        options.target
    );
    if options.load_instruments {
        sink.load_instruments(&playback)?;
    }
    sink.render(&playback, options)?;
    Ok(playback)
}

/// An [`AudioSink`] that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn load_instruments(&mut self, _score: &PlaybackScore) -> Result<(), AudioError> {
        Ok(())
    }

    fn render(&mut self, _score: &PlaybackScore, _options: &PlayOptions) -> Result<(), AudioError> {
        Ok(())
    }
}
