//! Commands sent from the main thread to the audio thread via ring buffer.

/// Commands sent from the main thread to the audio thread via ring buffer.
#[derive(Debug)]
pub enum AudioCommand {
    /// Mix rendered audio into whatever is already playing, starting at the
    /// current play position. Interleaved samples (L, R, L, R, ...).
    Mix(Vec<f32>),

    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),

    /// Silence everything queued.
    Stop,
}
