//! Synthesized percussion, played from General MIDI drum-map pitches.
//!
//! Each generator produces a mono buffer at the requested sample rate.
//! Noise-based generators use a seeded `ChaCha8Rng` for determinism.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::event::{RenderContext, SoundingEvent};

use super::oscillator::{midi_to_freq, one_pole_alpha};
use super::Instrument;

/// The drum a pitch triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drum {
    Kick,
    Snare,
    Clap,
    Hat { open: bool },
    Cymbal,
    /// Pitched membrane, starting frequency in Hz.
    Tom(f64),
}

impl Drum {
    /// Map a General MIDI percussion key. Keys outside the drum map play
    /// a tom tuned to the note.
    pub fn from_pitch(pitch: u8) -> Self {
        match pitch {
            35 | 36 => Drum::Kick,
            38 | 40 => Drum::Snare,
            37 | 39 => Drum::Clap,
            42 | 44 => Drum::Hat { open: false },
            46 => Drum::Hat { open: true },
            49 | 51 | 52 | 55 | 57 | 59 => Drum::Cymbal,
            41 => Drum::Tom(90.0),
            43 => Drum::Tom(110.0),
            45 => Drum::Tom(130.0),
            47 => Drum::Tom(160.0),
            48 => Drum::Tom(190.0),
            50 => Drum::Tom(220.0),
            other => Drum::Tom(midi_to_freq(other).clamp(60.0, 1000.0)),
        }
    }

    /// Generate the mono hit.
    pub fn generate(self, sample_rate: u32, seed: u64) -> Vec<f32> {
        match self {
            Drum::Kick => generate_kick(sample_rate),
            Drum::Snare => generate_snare(sample_rate, seed),
            Drum::Clap => generate_clap(sample_rate, seed),
            Drum::Hat { open } => generate_hihat(sample_rate, seed, if open { 0.3 } else { 0.08 }),
            Drum::Cymbal => generate_hihat(sample_rate, seed, 0.9),
            Drum::Tom(freq) => generate_tom(sample_rate, freq),
        }
    }
}

/// Kick drum (~250ms): sine with an exponential pitch sweep from 150 Hz
/// down to 50 Hz and a fast exponential decay.
pub fn generate_kick(sample_rate: u32) -> Vec<f32> {
    generate_sweep(sample_rate, 0.25, 50.0, 100.0, 10.0)
}

/// Tom (~300ms): like a kick, higher and with a gentler sweep.
pub fn generate_tom(sample_rate: u32, freq: f64) -> Vec<f32> {
    generate_sweep(sample_rate, 0.3, freq, freq * 0.5, 8.0)
}

fn generate_sweep(sample_rate: u32, duration_secs: f64, base: f64, sweep: f64, decay: f64) -> Vec<f32> {
    let num_samples = (sample_rate as f64 * duration_secs) as usize;
    let mut output = Vec::with_capacity(num_samples);
    let mut phase = 0.0_f64;

    for i in 0..num_samples {
        let t = i as f64 / sample_rate as f64;
        let norm = t / duration_secs;

        let freq = base + sweep * (-norm * 8.0).exp();
        let amp = (-norm * decay).exp();

        phase += freq / sample_rate as f64;
        let sample = (phase * 2.0 * std::f64::consts::PI).sin() * amp;
        output.push(sample as f32);
    }

    output
}

/// Snare (~200ms): 180 Hz sine body plus white noise, each with its own
/// decay.
pub fn generate_snare(sample_rate: u32, seed: u64) -> Vec<f32> {
    let duration_secs = 0.2;
    let num_samples = (sample_rate as f64 * duration_secs) as usize;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut output = Vec::with_capacity(num_samples);
    let mut phase = 0.0_f64;

    for i in 0..num_samples {
        let norm = i as f64 / sample_rate as f64 / duration_secs;

        let body_amp = (-norm * 15.0).exp();
        phase += 180.0 / sample_rate as f64;
        let body = (phase * 2.0 * std::f64::consts::PI).sin() * body_amp;

        let noise_amp = (-norm * 12.0).exp();
        let noise: f64 = rng.gen_range(-1.0..1.0) * noise_amp;

        output.push((body * 0.5 + noise * 0.5) as f32);
    }

    output
}

/// Hi-hat or cymbal: high-passed white noise with exponential decay over
/// `duration_secs`.
pub fn generate_hihat(sample_rate: u32, seed: u64, duration_secs: f64) -> Vec<f32> {
    let num_samples = (sample_rate as f64 * duration_secs) as usize;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut output = Vec::with_capacity(num_samples);

    // One-pole high-pass: y[n] = a * (y[n-1] + x[n] - x[n-1])
    let mut prev_input = 0.0_f64;
    let mut prev_output = 0.0_f64;
    let a = 0.85;

    for i in 0..num_samples {
        let norm = i as f64 / sample_rate as f64 / duration_secs;
        let amp = (-norm * 6.0).exp();
        let noise: f64 = rng.gen_range(-1.0..1.0);

        let filtered = a * (prev_output + noise - prev_input);
        prev_input = noise;
        prev_output = filtered;

        output.push((filtered * amp) as f32);
    }

    output
}

/// Clap (~150ms): three staggered noise bursts, then a band-limited tail.
pub fn generate_clap(sample_rate: u32, seed: u64) -> Vec<f32> {
    let duration_secs = 0.15;
    let num_samples = (sample_rate as f64 * duration_secs) as usize;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut output = vec![0.0f32; num_samples];

    let burst_len_secs = 0.01;
    for offset in [0.0, 0.015, 0.030] {
        let start = (offset * sample_rate as f64) as usize;
        let end = ((offset + burst_len_secs) * sample_rate as f64) as usize;
        for (i, sample) in output
            .iter_mut()
            .enumerate()
            .take(end.min(num_samples))
            .skip(start)
        {
            let local_t = (i - start) as f64 / (burst_len_secs * sample_rate as f64);
            let env = (-local_t * 15.0).exp();
            let noise: f64 = rng.gen_range(-1.0..1.0);
            *sample += (noise * env * 0.7) as f32;
        }
    }

    let tail_start = (0.04 * sample_rate as f64) as usize;
    let alpha = one_pole_alpha(1200.0, sample_rate);
    let mut state = 0.0_f64;

    for (i, sample) in output.iter_mut().enumerate().skip(tail_start) {
        let t = (i - tail_start) as f64 / sample_rate as f64;
        let tail_amp = (-t * 18.0).exp();
        let noise: f64 = rng.gen_range(-1.0..1.0);
        state += alpha * (noise - state);
        *sample += (state * tail_amp * 1.5) as f32;
    }

    output
}

/// A drum kit played through the General MIDI percussion map.
///
/// Drums ring for their natural length regardless of note duration.
#[derive(Debug, Clone)]
pub struct Percussion {
    seed: u64,
}

impl Percussion {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Instrument for Percussion {
    fn render(&self, event: &SoundingEvent, ctx: &RenderContext) -> Vec<f32> {
        let velocity = event.velocity();
        if velocity <= 0.0 {
            return Vec::new();
        }

        let mono = Drum::from_pitch(event.pitch)
            .generate(ctx.sample_rate, self.seed.wrapping_add(event.pitch as u64));

        let mut output = Vec::with_capacity(mono.len() * ctx.channels as usize);
        for s in mono {
            let s = (s * velocity).clamp(-1.0, 1.0);
            for _ in 0..ctx.channels {
                output.push(s);
            }
        }
        output
    }

    fn name(&self) -> &str {
        "percussion"
    }
}
