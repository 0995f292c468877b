//! Google Translate TTS backend
//!
//! Speaks the same protocol as gTTS: the text is cut into chunks of at most
//! [`MAX_CHUNK_CHARS`] characters, each chunk is fetched as MP3, and the
//! chunks are concatenated in order into one file.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{AudioTrack, SpeechSynthesizer, SynthesisError};
use crate::config::SpeechConfig;
use crate::probe;
use crate::script::wrap_words;

/// Longest text the endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

pub struct GoogleTts {
    client: Client,
    config: SpeechConfig,
    ffprobe_path: String,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig, ffprobe_path: &str) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .user_agent(concat!("beanflow/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            ffprobe_path: ffprobe_path.to_string(),
        })
    }

    fn speed(&self) -> &'static str {
        if self.config.slow {
            "0.3"
        } else {
            "1"
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, SynthesisError> {
        let total_str = total.to_string();
        let index_str = index.to_string();
        let len_str = chunk.chars().count().to_string();

        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.config.language.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", self.speed()),
                ("total", total_str.as_str()),
                ("idx", index_str.as_str()),
                ("textlen", len_str.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SynthesisError::Status {
                status: resp.status().as_u16(),
                chunk: index,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    fn name(&self) -> &'static str {
        "google-tts"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let chunks = wrap_words(text, MAX_CHUNK_CHARS);
        info!(
            "Synthesizing {} chars in {} chunks ({})",
            text.chars().count(),
            chunks.len(),
            self.config.language
        );

        let mut file = File::create(output).await?;
        for (index, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, index, chunks.len()).await?;
            debug!("TTS chunk {index}: {} bytes", bytes.len());
            file.write_all(&bytes).await?;
        }
        file.flush().await?;

        let duration = probe::duration_secs(&self.ffprobe_path, output).await?;
        info!("Audio saved to {} ({duration:.1}s)", output.display());

        AudioTrack::new(output, duration)
    }
}
