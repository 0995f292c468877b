//! Speech synthesis for the pitch narration
//!
//! A [`SpeechSynthesizer`] turns the full script text into an audio file and
//! reports the file's measured duration. [`GoogleTts`] is the production
//! implementation.

pub mod google;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::probe::ProbeError;

pub use google::GoogleTts;

/// Speech synthesis errors. All are fatal for a run.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("cannot synthesize empty text")]
    EmptyText,

    #[error("TTS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("TTS service returned HTTP {status} for chunk {chunk}")]
    Status { status: u16, chunk: usize },

    #[error("could not measure synthesized audio: {0}")]
    Probe(#[from] ProbeError),

    #[error("synthesized audio has no usable duration ({duration}s): {path}")]
    InvalidDuration { path: String, duration: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A synthesized narration file with its measured duration.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    path: PathBuf,
    duration_secs: f64,
}

impl AudioTrack {
    /// Wrap a synthesized file. The duration must be positive and finite.
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64) -> Result<Self, SynthesisError> {
        let path = path.into();
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(SynthesisError::InvalidDuration {
                path: path.display().to_string(),
                duration: duration_secs,
            });
        }
        Ok(Self {
            path,
            duration_secs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// Text-to-speech collaborator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Synthesize `text` into `output` and measure the result.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack, SynthesisError>;
}
