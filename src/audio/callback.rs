//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, mixes new material into the
//! playback buffer, fills the output and applies volume and the master
//! limiter.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use super::limiter::Limiter;

/// When `read_pos` passes this many samples, consumed data is dropped.
const COMPACT_THRESHOLD: usize = 8192;

/// Flags shared between the audio thread and everyone else.
#[derive(Debug, Clone, Default)]
pub struct PlaybackFlags {
    /// Set from any thread to silence playback; cleared by the callback.
    pub stop: Arc<AtomicBool>,
    /// Samples still queued for output.
    pub pending: Arc<AtomicUsize>,
}

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    playback_buffer: Vec<f32>,
    read_pos: usize,
    volume: f32,
    limiter: Limiter,
    flags: PlaybackFlags,
}

impl AudioCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, flags: PlaybackFlags) -> Self {
        Self {
            consumer,
            playback_buffer: Vec::new(),
            read_pos: 0,
            volume: 1.0,
            limiter: Limiter::default(),
            flags,
        }
    }

    /// Called by cpal for each audio period. Fills `output` with samples.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Mix(data) => self.mix(&data),
                AudioCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
                AudioCommand::Stop => self.clear(),
            }
        }

        if self.flags.stop.swap(false, Ordering::AcqRel) {
            self.clear();
        }

        let available = self.playback_buffer.len() - self.read_pos;
        let copy_len = output.len().min(available);

        for (out, &src) in output[..copy_len]
            .iter_mut()
            .zip(&self.playback_buffer[self.read_pos..self.read_pos + copy_len])
        {
            *out = src * self.volume;
        }
        self.read_pos += copy_len;

        for sample in output[copy_len..].iter_mut() {
            *sample = 0.0;
        }

        self.limiter.process_block(output);

        if self.read_pos >= COMPACT_THRESHOLD {
            self.playback_buffer.drain(..self.read_pos);
            self.read_pos = 0;
        }

        self.flags
            .pending
            .store(self.playback_buffer.len() - self.read_pos, Ordering::Release);
    }

    /// Add `data` on top of the unplayed part of the buffer.
    fn mix(&mut self, data: &[f32]) {
        let end = self.read_pos + data.len();
        if end > self.playback_buffer.len() {
            self.playback_buffer.resize(end, 0.0);
        }
        for (dst, &src) in self.playback_buffer[self.read_pos..end].iter_mut().zip(data) {
            *dst += src;
        }
    }

    fn clear(&mut self) {
        self.playback_buffer.clear();
        self.read_pos = 0;
    }
}
