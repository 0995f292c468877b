//! Full generation pipeline: synthesize -> produce visuals -> align -> encode
//!
//! Stages run strictly in sequence. Only a stock footage failure is
//! recovered (by switching to text slides); every other error ends the run.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::assemble::{
    remove_if_exists, Assembler, EncodingError, FfmpegEncoder, OutputVideo, VideoEncoder,
};
use crate::config::GeneratorConfig;
use crate::script::PitchScript;
use crate::speech::{GoogleTts, SpeechSynthesizer, SynthesisError};
use crate::timeline::{EmptyTimelineError, Timeline};
use crate::visual::{SlideError, VisualError, VisualMode, VisualProducer};

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    EmptyTimeline(#[from] EmptyTimelineError),

    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("slide rendering failed: {0}")]
    Slide(#[from] SlideError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The encoded video
    pub output: OutputVideo,
    /// Visual mode actually used
    pub mode: VisualMode,
    /// True if stock footage was requested but text slides were used
    pub fell_back: bool,
    /// Number of timeline segments
    pub segment_count: usize,
    /// Measured narration length
    pub audio_duration_secs: f64,
    /// Processing time in seconds
    pub processing_time_secs: f64,
}

/// One-shot pitch video pipeline
pub struct Pipeline {
    config: GeneratorConfig,
    synthesizer: Box<dyn SpeechSynthesizer>,
    producer: VisualProducer,
    encoder: Box<dyn VideoEncoder>,
    assembler: Assembler,
}

impl Pipeline {
    /// Create a pipeline with the production collaborators. `credential`
    /// is the already-resolved Pexels key, if any.
    pub fn new(config: GeneratorConfig, credential: Option<&str>) -> Result<Self, PipelineError> {
        let synthesizer = GoogleTts::new(&config.speech, &config.encoder.ffprobe_path)?;
        let producer = VisualProducer::select(&config, credential)?;
        let encoder = FfmpegEncoder::new(&config.encoder);

        Ok(Self::with_collaborators(
            config,
            Box::new(synthesizer),
            producer,
            Box::new(encoder),
        ))
    }

    /// Create a pipeline with explicit collaborators.
    pub fn with_collaborators(
        config: GeneratorConfig,
        synthesizer: Box<dyn SpeechSynthesizer>,
        producer: VisualProducer,
        encoder: Box<dyn VideoEncoder>,
    ) -> Self {
        let assembler = Assembler::new(&config.encoder);
        Self {
            config,
            synthesizer,
            producer,
            encoder,
            assembler,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Mode selected at construction.
    pub fn mode(&self) -> VisualMode {
        self.producer.mode()
    }

    pub fn output_path(&self) -> PathBuf {
        self.config.output_path()
    }

    /// Run the whole pipeline for `script`.
    pub async fn run(&self, script: &PitchScript) -> Result<PipelineResult, PipelineError> {
        let start_time = std::time::Instant::now();
        let output_path = self.output_path();
        let work_dir = self.config.work_dir();

        info!("{}", "=".repeat(60));
        info!("BeanFlow Video Generator ({})", self.producer.mode());
        info!("{}", "=".repeat(60));

        fs::create_dir_all(&work_dir).await?;
        remove_if_exists(&output_path).await?;

        // Step 1: Narration
        info!("Generating audio from script with {}...", self.synthesizer.name());
        let audio = self
            .synthesizer
            .synthesize(script.full_text(), &work_dir.join("audio.mp3"))
            .await?;

        // Step 2: Visuals
        let (segments, mode, fell_back) = match self.producer.produce(script, &work_dir).await {
            Ok(segments) => (segments, self.producer.mode(), false),
            Err(VisualError::Footage(e)) => {
                warn!("Stock footage unavailable ({e}); falling back to text slides");
                let segments = self.producer.text_slides().produce(script, &work_dir)?;
                (segments, VisualMode::TextSlides, true)
            }
            Err(VisualError::Slide(e)) => return Err(e.into()),
        };
        info!("Produced {} visual segments ({mode})", segments.len());

        // Step 3: Timeline
        let timeline = Timeline::build(audio.duration_secs(), segments, &self.config.timing)?;
        if timeline.total_duration() > timeline.audio_duration() {
            info!(
                "Holding final segment: {:.1}s visual for {:.1}s narration",
                timeline.total_duration().as_secs_f64(),
                audio.duration_secs()
            );
        }

        // Step 4: Encode
        info!("Exporting final video to {}...", output_path.display());
        let output = self
            .assembler
            .assemble(self.encoder.as_ref(), &timeline, &audio, &output_path)
            .await?;

        if !self.config.keep_work_files {
            cleanup_work_dir(&work_dir).await;
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        info!("Video generated successfully: {}", output.path.display());
        info!("Duration: {:.1} seconds", output.duration.as_secs_f64());
        info!("Pipeline completed in {:.2}s", elapsed);

        Ok(PipelineResult {
            output,
            mode,
            fell_back,
            segment_count: timeline.len(),
            audio_duration_secs: audio.duration_secs(),
            processing_time_secs: elapsed,
        })
    }
}

async fn cleanup_work_dir(work_dir: &Path) {
    match fs::remove_dir_all(work_dir).await {
        Ok(()) => debug!("Removed work directory {}", work_dir.display()),
        Err(e) => warn!("Could not remove {}: {e}", work_dir.display()),
    }
}
