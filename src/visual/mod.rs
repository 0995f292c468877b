//! Visual segments for the pitch video
//!
//! Two producers share one output type:
//!
//! - **Text slides** - one rendered 1920x1080 image per script segment
//! - **Stock footage** - one downloaded Pexels clip per search query
//!
//! The producer is chosen once per run by [`VisualProducer::select`].

pub mod footage;
pub mod slides;

use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{resolve_credential, GeneratorConfig};
use crate::script::PitchScript;

pub use footage::{
    FootageHit, FootageSearch, FootageUnavailableError, PexelsClient, StockFootageProducer,
};
pub use slides::{SlideError, SlideRenderer, TextSlideProducer};

/// Visual production errors
#[derive(Error, Debug)]
pub enum VisualError {
    #[error(transparent)]
    Footage(#[from] FootageUnavailableError),

    #[error(transparent)]
    Slide(#[from] SlideError),
}

/// Where a segment's pixels come from.
#[derive(Debug, Clone)]
pub enum VisualSource {
    /// Rendered text slide, saved as PNG
    Slide {
        text: String,
        image: RgbImage,
        path: PathBuf,
    },
    /// Downloaded footage clip
    Clip {
        query: String,
        path: PathBuf,
        source_duration_secs: f64,
    },
}

/// One unit of the visual stream. Offsets are zero until the timeline
/// assigns them.
#[derive(Debug, Clone)]
pub struct VisualSegment {
    pub source: VisualSource,
    /// Relative share of the timeline
    pub weight: f64,
    start_offset: Duration,
    display_duration: Duration,
}

impl VisualSegment {
    pub fn slide(text: impl Into<String>, image: RgbImage, path: PathBuf, weight: f64) -> Self {
        Self::from_source(
            VisualSource::Slide {
                text: text.into(),
                image,
                path,
            },
            weight,
        )
    }

    pub fn clip(query: impl Into<String>, path: PathBuf, source_duration_secs: f64) -> Self {
        Self::from_source(
            VisualSource::Clip {
                query: query.into(),
                path,
                source_duration_secs,
            },
            1.0,
        )
    }

    fn from_source(source: VisualSource, weight: f64) -> Self {
        Self {
            source,
            weight,
            start_offset: Duration::ZERO,
            display_duration: Duration::ZERO,
        }
    }

    /// File fed to the encoder for this segment.
    pub fn input_path(&self) -> &Path {
        match &self.source {
            VisualSource::Slide { path, .. } | VisualSource::Clip { path, .. } => path,
        }
    }

    pub fn is_slide(&self) -> bool {
        matches!(self.source, VisualSource::Slide { .. })
    }

    pub fn start_offset(&self) -> Duration {
        self.start_offset
    }

    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }

    pub fn end(&self) -> Duration {
        self.start_offset + self.display_duration
    }

    pub(crate) fn assign(&mut self, start_offset: Duration, display_duration: Duration) {
        self.start_offset = start_offset;
        self.display_duration = display_duration;
    }
}

/// Which producer variant is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualMode {
    TextSlides,
    StockFootage,
}

impl std::fmt::Display for VisualMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextSlides => write!(f, "text slides"),
            Self::StockFootage => write!(f, "stock footage"),
        }
    }
}

/// Producer of the ordered visual segments.
pub enum VisualProducer {
    TextSlides(TextSlideProducer),
    StockFootage(StockFootageProducer),
}

impl VisualProducer {
    /// Pick the variant from the credential: a non-empty key selects stock
    /// footage, anything else selects text slides.
    pub fn select(config: &GeneratorConfig, credential: Option<&str>) -> Result<Self, SlideError> {
        let slides = TextSlideProducer::new(&config.slides)?;

        let Some(key) = resolve_credential(credential) else {
            info!("Will create text-based video (no API key needed)");
            return Ok(Self::TextSlides(slides));
        };

        match PexelsClient::new(&key, &config.footage) {
            Ok(client) => {
                info!("Will use Pexels stock footage");
                Ok(Self::StockFootage(StockFootageProducer::new(
                    Box::new(client),
                    config.footage.clone(),
                    slides,
                )))
            }
            Err(e) => {
                warn!("Pexels client unavailable ({e}); using text slides");
                Ok(Self::TextSlides(slides))
            }
        }
    }

    pub fn mode(&self) -> VisualMode {
        match self {
            Self::TextSlides(_) => VisualMode::TextSlides,
            Self::StockFootage(_) => VisualMode::StockFootage,
        }
    }

    /// The text slide producer, used directly or as the footage fallback.
    pub fn text_slides(&self) -> &TextSlideProducer {
        match self {
            Self::TextSlides(slides) => slides,
            Self::StockFootage(footage) => footage.slides(),
        }
    }

    /// Produce segments with unassigned durations into `work_dir`.
    pub async fn produce(
        &self,
        script: &PitchScript,
        work_dir: &Path,
    ) -> Result<Vec<VisualSegment>, VisualError> {
        match self {
            Self::TextSlides(slides) => Ok(slides.produce(script, work_dir)?),
            Self::StockFootage(footage) => footage.produce(work_dir).await,
        }
    }
}
