//! Tone synth — a bank of oscillator partials through an ADSR and an
//! optional one-pole low-pass.
//!
//! The keys, organ, pad, bass and lead patches are all presets of this one
//! synth, differing in waveform, partials, envelope and filter.

use crate::event::{RenderContext, SoundingEvent};

use super::envelope::AdsrEnvelope;
use super::oscillator::{cents_to_ratio, midi_to_freq, one_pole_alpha, oscillator, Waveform};
use super::Instrument;

/// One oscillator: frequency ratio to the note and its gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub ratio: f64,
    pub gain: f64,
}

const fn partial(ratio: f64, gain: f64) -> Partial {
    Partial { ratio, gain }
}

#[derive(Debug, Clone)]
pub struct ToneSynth {
    name: &'static str,
    waveform: Waveform,
    partials: Vec<Partial>,
    envelope: AdsrEnvelope,
    /// Low-pass cutoff in Hz, if filtered.
    cutoff: Option<f64>,
}

impl ToneSynth {
    pub fn new(
        name: &'static str,
        waveform: Waveform,
        partials: Vec<Partial>,
        envelope: AdsrEnvelope,
        cutoff: Option<f64>,
    ) -> Self {
        Self {
            name,
            waveform,
            partials,
            envelope,
            cutoff,
        }
    }

    /// Triangle with a quiet octave, quick decay to a low sustain.
    pub fn keys() -> Self {
        Self::new(
            "keys",
            Waveform::Triangle,
            vec![partial(1.0, 0.6), partial(2.0, 0.15)],
            AdsrEnvelope::new(0.005, 0.4, 0.35, 0.25),
            None,
        )
    }

    /// Drawbar-style sine stack at full sustain.
    pub fn organ() -> Self {
        Self::new(
            "organ",
            Waveform::Sine,
            vec![partial(1.0, 0.45), partial(2.0, 0.25), partial(4.0, 0.12)],
            AdsrEnvelope::new(0.01, 0.0, 1.0, 0.05),
            None,
        )
    }

    /// Two detuned saws with slow attack and long release.
    pub fn pad() -> Self {
        Self::new(
            "pad",
            Waveform::Saw,
            vec![partial(1.0, 0.3), partial(cents_to_ratio(12.0), 0.3)],
            AdsrEnvelope::new(0.15, 0.2, 0.6, 0.4),
            Some(4000.0),
        )
    }

    /// Mono detuned saws through a low-pass.
    pub fn bass() -> Self {
        Self::new(
            "bass",
            Waveform::Saw,
            vec![partial(1.0, 0.5), partial(cents_to_ratio(7.0), 0.5)],
            AdsrEnvelope::new(0.005, 0.1, 0.8, 0.05),
            Some(800.0),
        )
    }

    /// A single waveform with a slightly detuned double.
    pub fn lead(waveform: Waveform) -> Self {
        Self::new(
            "lead",
            waveform,
            vec![partial(1.0, 0.45), partial(cents_to_ratio(5.0), 0.15)],
            AdsrEnvelope::new(0.02, 0.1, 0.75, 0.1),
            Some(3000.0),
        )
    }
}

impl Instrument for ToneSynth {
    fn render(&self, event: &SoundingEvent, ctx: &RenderContext) -> Vec<f32> {
        let velocity = event.velocity() as f64;
        if velocity <= 0.0 || ctx.channels == 0 {
            return Vec::new();
        }

        let sr = ctx.sample_rate as f64;
        let freq = midi_to_freq(event.pitch);
        let steps: Vec<f64> = self.partials.iter().map(|p| freq * p.ratio / sr).collect();
        let mut phases = vec![0.0_f64; self.partials.len()];

        let note_secs = event.duration.as_secs_f64();
        let num_frames = self.envelope.frames(note_secs, ctx.sample_rate);
        let alpha = self.cutoff.map(|c| one_pole_alpha(c, ctx.sample_rate));
        let mut filter_state = 0.0_f64;

        let mut output = Vec::with_capacity(num_frames * ctx.channels as usize);

        for i in 0..num_frames {
            let t = i as f64 / sr;
            let env = self.envelope.amplitude(t, note_secs);

            let mut mixed = 0.0;
            for ((phase, step), p) in phases.iter_mut().zip(&steps).zip(&self.partials) {
                mixed += oscillator(self.waveform, *phase) * p.gain;
                *phase = (*phase + step).fract();
            }

            if let Some(alpha) = alpha {
                filter_state += alpha * (mixed - filter_state);
                mixed = filter_state;
            }

            let sample = (mixed * env * velocity) as f32;
            for _ in 0..ctx.channels {
                output.push(sample);
            }
        }

        output
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Offset, PartId};

    fn ctx() -> RenderContext {
        RenderContext {
            sample_rate: 44100,
            channels: 2,
        }
    }

    fn note(pitch: u8, ms: u64, volume: u8) -> SoundingEvent {
        SoundingEvent::new(Offset::ZERO, PartId(0), pitch, Offset::from_millis(ms), volume)
    }

    fn presets() -> Vec<ToneSynth> {
        vec![
            ToneSynth::keys(),
            ToneSynth::organ(),
            ToneSynth::pad(),
            ToneSynth::bass(),
            ToneSynth::lead(Waveform::Square),
        ]
    }

    #[test]
    fn every_preset_sounds() {
        for synth in presets() {
            let out = synth.render(&note(48, 450, 100), &ctx());
            assert!(!out.is_empty(), "{} rendered nothing", synth.name());
            assert!(
                out.iter().any(|&s| s.abs() > 0.01),
                "{} is silent",
                synth.name()
            );
        }
    }

    #[test]
    fn every_preset_bounded() {
        for synth in presets() {
            for &s in &synth.render(&note(60, 450, 100), &ctx()) {
                assert!(s.abs() <= 1.0, "{}: sample out of bounds: {s}", synth.name());
            }
        }
    }

    #[test]
    fn zero_volume_silent() {
        assert!(ToneSynth::keys().render(&note(60, 450, 0), &ctx()).is_empty());
    }

    #[test]
    fn length_covers_note_and_release() {
        let synth = ToneSynth::bass();
        let out = synth.render(&note(36, 500, 100), &ctx());
        // 0.5s note plus the release tail, stereo.
        let frames = out.len() / 2;
        assert_eq!(frames, synth.envelope.frames(0.5, 44100));
        assert!(frames > 22050);
    }

    #[test]
    fn stereo_channels_match() {
        let out = ToneSynth::organ().render(&note(60, 100, 80), &ctx());
        assert_eq!(out.len() % 2, 0);
        for chunk in out.chunks(2) {
            assert!((chunk[0] - chunk[1]).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn volume_scales_output() {
        let synth = ToneSynth::organ();
        let loud = synth.render(&note(60, 200, 100), &ctx());
        let quiet = synth.render(&note(60, 200, 50), &ctx());
        let peak = |v: &[f32]| v.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!((peak(&quiet) * 2.0 - peak(&loud)).abs() < 1e-3);
    }

    #[test]
    fn pad_has_slow_attack() {
        let out = ToneSynth::pad().render(&note(60, 2000, 100), &ctx());
        let early = &out[..100];
        let rms: f32 = (early.iter().map(|s| s * s).sum::<f32>() / early.len() as f32).sqrt();
        assert!(rms < 0.05, "pad should start quietly, rms={rms}");
    }

    #[test]
    fn preset_names() {
        let names: Vec<String> = presets().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["keys", "organ", "pad", "bass", "lead"]);
    }
}
