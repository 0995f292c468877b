//! Generator configuration loaded from `~/.config/beanflow/config.toml`.
//!
//! Every component receives its section of [`GeneratorConfig`] at
//! construction time; nothing reads global state during a run.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fixed output resolution (width, height).
pub const RESOLUTION: (u32, u32) = (1920, 1080);

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "beanflow_output";

/// Default output file name inside the output directory.
pub const DEFAULT_OUTPUT_FILE: &str = "beanflow_pitch.mp4";

/// Google Translate TTS endpoint (the gTTS contract).
pub const GOOGLE_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Pexels video search endpoint.
pub const PEXELS_SEARCH_ENDPOINT: &str = "https://api.pexels.com/videos/search";

/// An RGB color triple.
pub type Rgb = [u8; 3];

/// Visual style of generated text slides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideStyle {
    /// Background fill color
    pub background: Rgb,
    /// Text color
    pub text_color: Rgb,
    /// Font size in pixels
    pub font_size: f32,
    /// Total horizontal margin (split evenly left/right) used for wrapping
    pub margin: u32,
    /// Explicit TrueType/OpenType font; `None` searches system fonts
    pub font_path: Option<PathBuf>,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            background: [30, 30, 30],
            text_color: [255, 255, 255],
            font_size: 70.0,
            margin: 200,
            font_path: None,
        }
    }
}

/// Text-to-speech settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Language code passed to the TTS service (e.g., "en")
    pub language: String,
    /// Slow speech
    pub slow: bool,
    /// TTS endpoint URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            slow: false,
            endpoint: GOOGLE_TTS_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Stock footage search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootageConfig {
    /// Search queries, one clip per query, in timeline order
    pub queries: Vec<String>,
    /// Results requested per query
    pub per_page: u32,
    /// Upper bound on the number of queries used
    pub max_clips: usize,
    /// Search endpoint URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FootageConfig {
    fn default() -> Self {
        Self {
            queries: [
                "coffee shop busy",
                "coffee barista working",
                "people waiting in line",
                "mobile phone ordering",
                "artificial intelligence",
                "coffee preparation",
                "happy customers coffee",
                "business success",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            per_page: 3,
            max_clips: 8,
            endpoint: PEXELS_SEARCH_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Timeline alignment constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Lower bound on any single segment, in seconds
    pub min_segment_secs: f64,
    /// Lower bound on the whole video; the last segment is held to reach it
    pub min_total_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_segment_secs: 0.0,
            min_total_secs: 60.0,
        }
    }
}

/// ffmpeg encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Output frame rate
    pub fps: u32,
    /// Video codec
    pub video_codec: String,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate (e.g., "192k")
    pub audio_bitrate: Option<String>,
    /// x264 preset
    pub preset: Option<String>,
    /// Additional ffmpeg output arguments
    pub output_args: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: locate_tool("ffmpeg"),
            ffprobe_path: locate_tool("ffprobe"),
            fps: 24,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: Some("192k".to_string()),
            preset: Some("medium".to_string()),
            output_args: Vec::new(),
        }
    }
}

/// Full generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory receiving the final video (created if absent)
    pub output_dir: PathBuf,
    /// Final video file name
    pub output_file: String,
    /// Keep intermediate audio/slide/clip files after a successful run
    pub keep_work_files: bool,
    pub slides: SlideStyle,
    pub speech: SpeechConfig,
    pub footage: FootageConfig,
    pub timing: TimingConfig,
    pub encoder: EncoderConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            keep_work_files: false,
            slides: SlideStyle::default(),
            speech: SpeechConfig::default(),
            footage: FootageConfig::default(),
            timing: TimingConfig::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from an explicit file, or from the default
    /// location if it exists. Missing default file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an explicitly given file is missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Parse configuration from TOML text; absent keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Final video path.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// Scratch directory for intermediate files.
    pub fn work_dir(&self) -> PathBuf {
        self.output_dir.join("work")
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_keep_work_files(mut self, keep: bool) -> Self {
        self.keep_work_files = keep;
        self
    }
}

/// Return the path to the default config file.
fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beanflow")
        .join("config.toml")
}

fn locate_tool(name: &str) -> String {
    which::which(name).map_or_else(|_| name.to_string(), |p| p.to_string_lossy().to_string())
}

/// Normalize a raw credential: surrounding whitespace is dropped and an
/// empty string means "no credential".
pub fn resolve_credential(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToString::to_string)
}

/// Ask for the Pexels API key on `output`, reading one line from `input`.
///
/// End of input and an empty line both mean "skip stock footage".
pub fn prompt_api_key<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> std::io::Result<Option<String>> {
    write!(
        output,
        "\nEnter Pexels API key (or press Enter to skip for text-only video): "
    )?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(resolve_credential(Some(&line)))
}
