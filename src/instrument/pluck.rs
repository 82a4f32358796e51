//! Pluck synth: Karplus-Strong (noise burst + damped feedback delay).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::event::{RenderContext, SoundingEvent};

use super::oscillator::midi_to_freq;
use super::Instrument;

/// Ring-out after the note's audible length, in seconds.
const TAIL_SECS: f64 = 0.2;

/// Frames faded out at the very end to avoid a click.
const FADE_FRAMES: usize = 200;

/// Plucked strings, harp, harpsichord and mallets.
///
/// The noise burst is seeded from the base seed and the pitch, so the same
/// note always sounds the same.
#[derive(Debug, Clone)]
pub struct PluckSynth {
    seed: u64,
    /// Loss per pass through the delay line.
    damping: f64,
}

impl PluckSynth {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            damping: 0.996,
        }
    }
}

impl Instrument for PluckSynth {
    fn render(&self, event: &SoundingEvent, ctx: &RenderContext) -> Vec<f32> {
        let velocity = event.velocity() as f64;
        if velocity <= 0.0 {
            return Vec::new();
        }

        let freq = midi_to_freq(event.pitch);
        let delay_len = (ctx.sample_rate as f64 / freq).round() as usize;
        if delay_len < 2 {
            return Vec::new();
        }

        let total_secs = event.duration.as_secs_f64() + TAIL_SECS;
        let num_frames = (total_secs * ctx.sample_rate as f64) as usize;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(event.pitch as u64));
        let mut delay_buf: Vec<f64> = (0..delay_len).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut delay_idx = 0;

        let mut output = Vec::with_capacity(num_frames * ctx.channels as usize);

        for i in 0..num_frames {
            let sample = delay_buf[delay_idx];

            let next_idx = (delay_idx + 1) % delay_len;
            delay_buf[delay_idx] = (delay_buf[delay_idx] + delay_buf[next_idx]) * 0.5 * self.damping;
            delay_idx = next_idx;

            let remaining = num_frames - i;
            let fade = if remaining < FADE_FRAMES {
                remaining as f64 / FADE_FRAMES as f64
            } else {
                1.0
            };

            let s = (sample * velocity * fade * 0.8) as f32;
            for _ in 0..ctx.channels {
                output.push(s);
            }
        }

        output
    }

    fn name(&self) -> &str {
        "pluck"
    }
}
