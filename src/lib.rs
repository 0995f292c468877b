//! `BeanFlow` - narrated pitch video generator
//!
//! # Pipeline
//!
//! - **Speech**: the pitch narration is synthesized via Google Translate TTS
//! - **Visuals**: rendered text slides, or Pexels stock footage when an API
//!   key is supplied (falling back to slides if footage is unavailable)
//! - **Timeline**: segments are stretched to cover the narration
//! - **Assembly**: ffmpeg muxes everything into a 1920x1080 H.264/AAC MP4
//!
//! # Example
//!
//! ```rust,no_run
//! use beanflow::{GeneratorConfig, PitchScript, Pipeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(GeneratorConfig::default(), None)?;
//!     let result = pipeline.run(&PitchScript::beanflow()).await?;
//!     println!("Wrote {}", result.output.path.display());
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod pipeline;
pub mod probe;
pub mod script;
pub mod speech;
pub mod timeline;
pub mod visual;

pub use assemble::{Assembler, EncodePlan, EncodingError, FfmpegEncoder, OutputVideo, VideoEncoder};
pub use config::{prompt_api_key, resolve_credential, GeneratorConfig, SlideStyle};
pub use pipeline::{Pipeline, PipelineError, PipelineResult};
pub use script::{PitchScript, ScriptSegment};
pub use speech::{AudioTrack, GoogleTts, SpeechSynthesizer, SynthesisError};
pub use timeline::{EmptyTimelineError, Timeline};
pub use visual::{
    FootageHit, FootageSearch, FootageUnavailableError, StockFootageProducer, TextSlideProducer,
    VisualMode, VisualProducer, VisualSegment,
};

/// Version of beanflow
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
