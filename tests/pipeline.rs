//! End-to-end pipeline tests with in-process collaborators.
//!
//! Speech, footage search and encoding are replaced by fakes so the tests
//! exercise ordering, timing and file handling without network or ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use beanflow::config::FootageConfig;
use beanflow::visual::SlideRenderer;
use beanflow::{
    AudioTrack, EncodePlan, EncodingError, FootageHit, FootageSearch, FootageUnavailableError,
    GeneratorConfig, Pipeline, PipelineError, PitchScript, SlideStyle, SpeechSynthesizer,
    SynthesisError, TextSlideProducer, VideoEncoder, VisualMode, VisualProducer,
};

const SCRIPT: &str = "We built BeanFlow. It saves coffee shops time. Try it free.";

/// Writes a placeholder MP3 and reports a fixed duration.
struct FixedSpeech(f64);

#[async_trait]
impl SpeechSynthesizer for FixedSpeech {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        tokio::fs::write(output, b"ID3").await?;
        AudioTrack::new(output, self.0)
    }
}

/// Records plans and writes the partial output.
#[derive(Clone, Default)]
struct RecordingEncoder {
    plans: Arc<Mutex<Vec<EncodePlan>>>,
}

#[async_trait]
impl VideoEncoder for RecordingEncoder {
    async fn encode(&self, plan: &EncodePlan) -> Result<(), EncodingError> {
        self.plans.lock().unwrap().push(plan.clone());
        tokio::fs::write(&plan.partial_path, b"mp4").await?;
        Ok(())
    }
}

/// Writes a half-finished file, then fails.
struct BrokenEncoder;

#[async_trait]
impl VideoEncoder for BrokenEncoder {
    async fn encode(&self, plan: &EncodePlan) -> Result<(), EncodingError> {
        tokio::fs::write(&plan.partial_path, b"truncated").await?;
        Err(EncodingError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "Conversion failed!".to_string(),
        })
    }
}

/// Finds nothing for any query.
struct EmptySearch;

#[async_trait]
impl FootageSearch for EmptySearch {
    async fn search(
        &self,
        _query: &str,
        _per_page: u32,
    ) -> Result<Vec<FootageHit>, FootageUnavailableError> {
        Ok(Vec::new())
    }

    async fn download(&self, _url: &str, _dest: &Path) -> Result<(), FootageUnavailableError> {
        unreachable!("no hits to download")
    }
}

/// Rejects the API key.
struct RejectingSearch;

#[async_trait]
impl FootageSearch for RejectingSearch {
    async fn search(
        &self,
        _query: &str,
        _per_page: u32,
    ) -> Result<Vec<FootageHit>, FootageUnavailableError> {
        Err(FootageUnavailableError::Unauthorized(401))
    }

    async fn download(&self, _url: &str, _dest: &Path) -> Result<(), FootageUnavailableError> {
        unreachable!("search never succeeds")
    }
}

fn slides() -> TextSlideProducer {
    TextSlideProducer::with_renderer(SlideRenderer::without_font(&SlideStyle::default()))
}

fn config(dir: &Path) -> GeneratorConfig {
    GeneratorConfig::default().with_output_dir(dir)
}

fn text_pipeline(config: GeneratorConfig, audio_secs: f64, encoder: Box<dyn VideoEncoder>) -> Pipeline {
    Pipeline::with_collaborators(
        config,
        Box::new(FixedSpeech(audio_secs)),
        VisualProducer::TextSlides(slides()),
        encoder,
    )
}

// ─── Text slides ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_mode_produces_video_in_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = RecordingEncoder::default();
    let pipeline = text_pipeline(config(dir.path()), 75.0, Box::new(encoder.clone()));

    let result = pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();

    let expected: PathBuf = dir.path().join("beanflow_pitch.mp4");
    assert_eq!(result.output.path, expected);
    assert!(expected.is_file());
    assert!(!dir.path().join("beanflow_pitch.partial.mp4").exists());

    assert_eq!(result.mode, VisualMode::TextSlides);
    assert!(!result.fell_back);
    assert_eq!(result.segment_count, 3);
    assert_eq!((result.output.width, result.output.height), (1920, 1080));
    assert_eq!(result.output.video_codec, "libx264");
    assert_eq!(result.output.audio_codec, "aac");
    assert_eq!(result.output.duration, Duration::from_secs(75));

    let plans = encoder.plans.lock().unwrap();
    assert_eq!(plans.len(), 1);
    assert!(plans[0].args.iter().any(|a| a.contains("slide_002.png")));
}

#[tokio::test]
async fn short_narration_is_held_to_minimum_length() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = text_pipeline(config(dir.path()), 12.0, Box::new(RecordingEncoder::default()));

    let result = pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();

    assert_eq!(result.output.duration, Duration::from_secs(60));
    assert!(result.output.duration.as_secs_f64() >= result.audio_duration_secs);
}

#[tokio::test]
async fn work_dir_removed_unless_kept() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = text_pipeline(config(dir.path()), 20.0, Box::new(RecordingEncoder::default()));
    pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();
    assert!(!dir.path().join("work").exists());

    let kept = tempfile::tempdir().unwrap();
    let pipeline = text_pipeline(
        config(kept.path()).with_keep_work_files(true),
        20.0,
        Box::new(RecordingEncoder::default()),
    );
    pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();
    assert!(kept.path().join("work").join("audio.mp3").is_file());
    assert!(kept.path().join("work").join("slide_000.png").is_file());
}

#[tokio::test]
async fn identical_runs_produce_identical_plans_and_slides() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = RecordingEncoder::default();
    let config = config(dir.path()).with_keep_work_files(true);
    let slide = dir.path().join("work").join("slide_001.png");

    let first = text_pipeline(config.clone(), 33.3, Box::new(encoder.clone()));
    first.run(&PitchScript::from_text(SCRIPT)).await.unwrap();
    let first_slide = std::fs::read(&slide).unwrap();

    let second = text_pipeline(config, 33.3, Box::new(encoder.clone()));
    second.run(&PitchScript::from_text(SCRIPT)).await.unwrap();
    let second_slide = std::fs::read(&slide).unwrap();

    let plans = encoder.plans.lock().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0], plans[1]);
    assert_eq!(first_slide, second_slide);
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn encoder_failure_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("beanflow_pitch.mp4");
    std::fs::write(&output, b"stale").unwrap();

    let pipeline = text_pipeline(config(dir.path()), 20.0, Box::new(BrokenEncoder));
    let err = pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Encoding(EncodingError::Failed { .. })));
    assert!(err.to_string().contains("Conversion failed!"));
    assert!(!output.exists());
    assert!(!dir.path().join("beanflow_pitch.partial.mp4").exists());
}

#[tokio::test]
async fn empty_script_fails_in_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = text_pipeline(config(dir.path()), 20.0, Box::new(RecordingEncoder::default()));

    let err = pipeline.run(&PitchScript::from_text("   ")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Synthesis(SynthesisError::EmptyText)));
}

// ─── Stock footage fallback ──────────────────────────────────────────────────

#[tokio::test]
async fn missing_footage_falls_back_to_text_slides() {
    let dir = tempfile::tempdir().unwrap();
    let encoder = RecordingEncoder::default();
    let producer = VisualProducer::StockFootage(beanflow::StockFootageProducer::new(
        Box::new(EmptySearch),
        FootageConfig::default(),
        slides(),
    ));
    let pipeline = Pipeline::with_collaborators(
        config(dir.path()),
        Box::new(FixedSpeech(70.0)),
        producer,
        Box::new(encoder.clone()),
    );
    assert_eq!(pipeline.mode(), VisualMode::StockFootage);

    let result = pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();

    assert_eq!(result.mode, VisualMode::TextSlides);
    assert!(result.fell_back);
    assert_eq!(result.segment_count, 3);
    assert!(result.output.path.is_file());

    let plans = encoder.plans.lock().unwrap();
    assert!(!plans[0].args.iter().any(|a| a.contains("clip_")));
}

#[tokio::test]
async fn rejected_key_falls_back_to_text_slides() {
    let dir = tempfile::tempdir().unwrap();
    let producer = VisualProducer::StockFootage(beanflow::StockFootageProducer::new(
        Box::new(RejectingSearch),
        FootageConfig::default(),
        slides(),
    ));
    let pipeline = Pipeline::with_collaborators(
        config(dir.path()),
        Box::new(FixedSpeech(64.5)),
        producer,
        Box::new(RecordingEncoder::default()),
    );

    let result = pipeline.run(&PitchScript::from_text(SCRIPT)).await.unwrap();

    assert!(result.fell_back);
    assert_eq!(result.mode, VisualMode::TextSlides);
    assert_eq!(result.segment_count, 3);
    assert_eq!(result.output.duration, Duration::from_millis(64_500));
}

#[test]
fn blank_key_selects_text_slides() {
    let producer = VisualProducer::select(&GeneratorConfig::default(), Some("  \n")).unwrap();
    assert_eq!(producer.mode(), VisualMode::TextSlides);
}
