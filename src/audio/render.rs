//! Offline mixdown and the [`AudioSink`] that sends it to a device or a file.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::event::RenderContext;
use crate::instrument::InstrumentRouter;
use crate::repl::{AudioSink, PlayOptions, PlayTarget, PlaybackScore};

use super::{AudioEngine, AudioError, Limiter, PlaybackFlags, WavWriter};

/// Sample rate used for WAV files.
pub const WAV_SAMPLE_RATE: u32 = 44100;
/// Channel count used for WAV files.
pub const WAV_CHANNELS: u16 = 2;

/// Render every event of `score` at its sample offset and mix additively.
///
/// The buffer is as long as the last event's rendered tail.
pub fn mixdown(score: &PlaybackScore, router: &InstrumentRouter, ctx: &RenderContext) -> Vec<f32> {
    let channels = ctx.channels as usize;
    let mut output: Vec<f32> = Vec::new();

    for event in score.events() {
        let rendered = router.render(event, ctx);
        if rendered.is_empty() {
            continue;
        }

        let start = event.offset.to_sample_offset(ctx.sample_rate) as usize * channels;
        let end = start + rendered.len();
        if end > output.len() {
            output.resize(end, 0.0);
        }
        for (dst, &src) in output[start..end].iter_mut().zip(&rendered) {
            *dst += src;
        }
    }

    output
}

/// Plays dispatched scores through the live engine, into numbered WAV
/// files, or nowhere, depending on the play target.
///
/// The engine is opened on first live playback.
pub struct Renderer {
    router: InstrumentRouter,
    flags: PlaybackFlags,
    engine: Option<AudioEngine>,
    wav: Option<WavWriter>,
    last_wav: Option<PathBuf>,
}

impl Renderer {
    pub fn new(seed: u64) -> Self {
        Self {
            router: InstrumentRouter::new(seed),
            flags: PlaybackFlags::default(),
            engine: None,
            wav: None,
            last_wav: None,
        }
    }

    /// Flags shared with the live engine, for stopping playback from a
    /// signal handler.
    pub fn flags(&self) -> PlaybackFlags {
        self.flags.clone()
    }

    pub fn router(&self) -> &InstrumentRouter {
        &self.router
    }

    /// The file written by the most recent WAV playback.
    pub fn last_wav(&self) -> Option<&Path> {
        self.last_wav.as_deref()
    }

    /// Whether the live engine still has material queued.
    pub fn is_playing(&self) -> bool {
        self.engine.as_ref().is_some_and(AudioEngine::is_playing)
    }

    fn play_live(&mut self, score: &PlaybackScore, volume: f32) -> Result<(), AudioError> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => AudioEngine::open(self.flags.clone())?,
        };
        let engine = self.engine.insert(engine);
        let ctx = RenderContext {
            sample_rate: engine.sample_rate(),
            channels: engine.channels(),
        };
        let samples = mixdown(score, &self.router, &ctx);
        debug!("mixing {} sample(s) into live output", samples.len());
        engine.set_volume(volume)?;
        engine.mix(samples)
    }

    fn write_wav(
        &mut self,
        dir: &Path,
        score: &PlaybackScore,
        volume: f32,
    ) -> Result<(), AudioError> {
        let writer = match self.wav.take() {
            Some(writer) if writer.dir() == dir => writer,
            _ => WavWriter::new(dir, WAV_SAMPLE_RATE, WAV_CHANNELS),
        };
        let writer = self.wav.insert(writer);
        let ctx = RenderContext {
            sample_rate: writer.sample_rate(),
            channels: writer.channels(),
        };
        let mut samples = mixdown(score, &self.router, &ctx);
        let limiter = Limiter::default();
        for s in samples.iter_mut() {
            *s = limiter.process(*s * volume);
        }
        let path = writer.write_next(&samples)?;
        info!("wrote {}", path.display());
        self.last_wav = Some(path);
        Ok(())
    }
}

impl AudioSink for Renderer {
    fn load_instruments(&mut self, score: &PlaybackScore) -> Result<(), AudioError> {
        let loaded = self.router.load_instruments(score);
        if loaded > 0 {
            debug!("loaded {loaded} instrument(s)");
        }
        Ok(())
    }

    fn render(&mut self, score: &PlaybackScore, options: &PlayOptions) -> Result<(), AudioError> {
        let volume = options.volume.clamp(0.0, 1.0);
        match &options.target {
            PlayTarget::Silent => Ok(()),
            PlayTarget::Live => self.play_live(score, volume),
            PlayTarget::Wav(dir) => self.write_wav(dir, score, volume),
        }
    }
}
