//! REPL configuration — playback defaults loaded from ~/.refrain/config.yaml.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repl::{PlayOptions, PlayTarget};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Where playback goes, as written in the config file and on the command
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Live,
    Wav,
    Silent,
}

/// Settings for an interactive session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    pub target: TargetKind,
    /// Directory for numbered WAV files when `target` is `wav`.
    pub wav_dir: PathBuf,
    /// Load instruments for new parts before each playback.
    pub load_instruments: bool,
    /// Master gain, 0.0–1.0.
    pub volume: f32,
    /// Seed for noise-based instruments.
    pub seed: u64,
    /// Print the events each line added.
    pub show_events: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            target: TargetKind::Live,
            wav_dir: refrain_dir().join("takes"),
            load_instruments: true,
            volume: 0.8,
            seed: 42,
            show_events: false,
        }
    }
}

fn refrain_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".refrain");
    path
}

/// Default path for the config file.
pub fn default_config_path() -> PathBuf {
    refrain_dir().join("config.yaml")
}

impl ReplConfig {
    /// Load from `path`. A missing file gives the defaults; unknown fields
    /// are ignored and absent ones take their default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`ReplConfig::load`], but an unreadable or invalid file is
    /// logged and replaced by the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("{e}; using defaults");
            Self::default()
        })
    }

    /// Playback options for each turn.
    pub fn play_options(&self) -> PlayOptions {
        let target = match self.target {
            TargetKind::Live => PlayTarget::Live,
            TargetKind::Wav => PlayTarget::Wav(self.wav_dir.clone()),
            TargetKind::Silent => PlayTarget::Silent,
        };
        PlayOptions {
            target,
            load_instruments: self.load_instruments,
            volume: self.volume.clamp(0.0, 1.0),
        }
    }
}
