//! Audio output — live engine, offline mixdown and WAV files.
//!
//! The live [`AudioEngine`] owns the cpal output stream and communicates with
//! it via a lock-free ring buffer. The main thread sends [`AudioCommand`]s to
//! the audio thread, which drains them in its callback and mixes new material
//! in at the current play position.

pub mod callback;
pub mod command;
pub mod limiter;
pub mod render;
pub mod wav;

use std::sync::atomic::Ordering;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};

pub use callback::PlaybackFlags;
pub use command::AudioCommand;
pub use limiter::Limiter;
pub use render::{mixdown, Renderer};
pub use wav::WavWriter;

use callback::AudioCallback;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 64;

/// Audio errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to query device configuration.
    DeviceConfig(String),
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start the audio stream.
    StreamPlay(String),
    /// Ring buffer is full; the audio thread is not draining fast enough.
    BufferFull,
    /// Failed to write a WAV file.
    Wav(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device found"),
            AudioError::DeviceConfig(e) => write!(f, "device config error: {e}"),
            AudioError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            AudioError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            AudioError::BufferFull => write!(f, "audio command ring buffer is full"),
            AudioError::Wav(e) => write!(f, "WAV error: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        AudioError::Wav(e.to_string())
    }
}

/// The live audio engine. Owns the cpal stream and ring buffer producer.
pub struct AudioEngine {
    /// Held for its lifetime; dropping it stops output.
    _stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    flags: PlaybackFlags,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Open the default output device with its default configuration.
    pub fn open(flags: PlaybackFlags) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let mut audio_callback = AudioCallback::new(consumer, flags.clone());

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                |err: cpal::StreamError| warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        info!("audio engine open: {sample_rate} Hz, {channels} ch");

        Ok(Self {
            _stream: stream,
            producer,
            flags,
            sample_rate,
            channels,
        })
    }

    /// Mix interleaved samples into the output at the current play head.
    pub fn mix(&mut self, samples: Vec<f32>) -> Result<(), AudioError> {
        self.push(AudioCommand::Mix(samples))
    }

    /// Set master volume (clamped to 0.0..=1.0 on the audio thread).
    pub fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.push(AudioCommand::SetVolume(volume))
    }

    /// Silence everything queued.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        self.push(AudioCommand::Stop)
    }

    fn push(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        self.producer
            .try_push(cmd)
            .map_err(|_| AudioError::BufferFull)
    }

    /// Whether material is still queued for output.
    pub fn is_playing(&self) -> bool {
        self.flags.pending.load(Ordering::Acquire) > 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
