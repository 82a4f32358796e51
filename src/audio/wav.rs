//! WAV output: 32-bit float files, one per playback.

use std::path::{Path, PathBuf};

use log::debug;

use super::AudioError;

/// Write interleaved `samples` to `path` as a 32-bit float WAV.
pub fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes numbered files (`turn-0001.wav`, `turn-0002.wav`, …) into a
/// directory, never overwriting an existing one.
#[derive(Debug, Clone)]
pub struct WavWriter {
    dir: PathBuf,
    next: u32,
    sample_rate: u32,
    channels: u16,
}

impl WavWriter {
    pub fn new(dir: impl Into<PathBuf>, sample_rate: u32, channels: u16) -> Self {
        Self {
            dir: dir.into(),
            next: 1,
            sample_rate,
            channels,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Write `samples` to the next free numbered file and return its path.
    pub fn write_next(&mut self, samples: &[f32]) -> Result<PathBuf, AudioError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AudioError::Wav(format!("{}: {e}", self.dir.display())))?;

        let mut path = self.numbered(self.next);
        while path.exists() {
            self.next += 1;
            path = self.numbered(self.next);
        }
        self.next += 1;

        write_wav(&path, samples, self.sample_rate, self.channels)?;
        debug!("wrote {} sample(s) to {}", samples.len(), path.display());
        Ok(path)
    }

    fn numbered(&self, n: u32) -> PathBuf {
        self.dir.join(format!("turn-{n:04}.wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn read_back(path: &Path) -> (hound::WavSpec, Vec<f32>) {
        let reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        let samples = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn writes_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&path, &[0.25, -0.5, 0.75, 0.0], 22050, 2).unwrap();

        let (spec, samples) = read_back(&path);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);
        assert_eq!(samples.len(), 4);
        assert_approx_eq!(samples[1], -0.5);
        assert_approx_eq!(samples[2], 0.75);
    }

    #[test]
    fn numbers_files_per_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = WavWriter::new(dir.path().join("takes"), 44100, 2);

        let first = writer.write_next(&[0.1, 0.1]).unwrap();
        let second = writer.write_next(&[0.2, 0.2]).unwrap();
        assert_eq!(first.file_name().unwrap(), "turn-0001.wav");
        assert_eq!(second.file_name().unwrap(), "turn-0002.wav");
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("turn-0001.wav"), &[0.0], 44100, 1).unwrap();

        let mut writer = WavWriter::new(dir.path(), 44100, 1);
        let path = writer.write_next(&[0.5]).unwrap();
        assert_eq!(path.file_name().unwrap(), "turn-0002.wav");
    }

    #[test]
    fn empty_mixdown_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = WavWriter::new(dir.path(), 44100, 2);
        let path = writer.write_next(&[]).unwrap();
        assert!(read_back(&path).1.is_empty());
    }
}
