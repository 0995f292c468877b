//! ffmpeg-based assembly of the final pitch video
//!
//! Each timeline segment becomes one ffmpeg input: slides are looped stills,
//! clips are stream-looped and trimmed. A filter graph normalizes every
//! input to 1920x1080, concatenates them, and pads the narration with
//! silence to the visual length. Output is H.264 + AAC in MP4.
//!
//! The encoder writes to a `.partial.mp4` sibling that is renamed into place
//! only on success, so a failed run never leaves a finished-looking file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{EncoderConfig, RESOLUTION};
use crate::probe;
use crate::speech::AudioTrack;
use crate::timeline::Timeline;

/// Encoding errors. Fatal; ffmpeg's diagnostic is carried verbatim.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("video encoder not found: {0}")]
    ToolMissing(String),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("encoder reported success but produced no file at {0}")]
    MissingOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The finished video.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputVideo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub duration: Duration,
}

/// A fully specified encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan {
    /// Arguments after the program name
    pub args: Vec<String>,
    /// Where the encoder writes
    pub partial_path: PathBuf,
    /// Where the file ends up on success
    pub output_path: PathBuf,
    /// Length of the encoded video
    pub duration: Duration,
}

/// Video-encoding collaborator.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Run the plan, producing `plan.partial_path`.
    async fn encode(&self, plan: &EncodePlan) -> Result<(), EncodingError>;
}

/// Runs ffmpeg as a subprocess.
pub struct FfmpegEncoder {
    ffmpeg_path: String,
}

impl FfmpegEncoder {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
        }
    }

    /// Check if ffmpeg is available
    pub async fn check_available(&self) -> bool {
        probe::tool_available(&self.ffmpeg_path).await
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(&self, plan: &EncodePlan) -> Result<(), EncodingError> {
        debug!("ffmpeg args: {:?}", plan.args);

        let output = Command::new(&self.ffmpeg_path)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncodingError::ToolMissing(self.ffmpeg_path.clone())
                } else {
                    EncodingError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(EncodingError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

fn secs(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// Partial-output sibling: `pitch.mp4` -> `pitch.partial.mp4`.
pub fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
    output.with_file_name(format!("{stem}.partial.mp4"))
}

/// Builds and runs the final encode.
pub struct Assembler {
    config: EncoderConfig,
}

impl Assembler {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Per-input normalization plus concat and audio padding.
    fn build_filter_complex(&self, timeline: &Timeline) -> String {
        let (width, height) = RESOLUTION;
        let fps = self.config.fps;
        let mut filters = Vec::with_capacity(timeline.len() + 2);
        let mut labels = String::new();

        for (index, segment) in timeline.segments().iter().enumerate() {
            filters.push(format!(
                "[{index}:v]scale={width}:{height}:force_original_aspect_ratio=decrease,\
                 pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color=black,\
                 setsar=1,fps={fps},format=yuv420p,\
                 trim=duration={dur},setpts=PTS-STARTPTS[v{index}]",
                dur = secs(segment.display_duration()),
            ));
            labels.push_str(&format!("[v{index}]"));
        }

        filters.push(format!(
            "{labels}concat=n={n}:v=1:a=0[vout]",
            n = timeline.len()
        ));
        filters.push(format!(
            "[{audio}:a]apad=whole_dur={total}[aout]",
            audio = timeline.len(),
            total = secs(timeline.total_duration()),
        ));

        filters.join(";")
    }

    /// Build the ffmpeg invocation for `timeline` + `audio` -> `output`.
    pub fn plan(&self, timeline: &Timeline, audio: &AudioTrack, output: &Path) -> EncodePlan {
        let partial = partial_path(output);
        let total = timeline.total_duration();
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-y"]
            .iter()
            .map(ToString::to_string)
            .collect();

        for segment in timeline.segments() {
            let dur = secs(segment.display_duration());
            if segment.is_slide() {
                args.extend(["-loop".to_string(), "1".to_string()]);
                args.extend(["-framerate".to_string(), self.config.fps.to_string()]);
            } else {
                args.extend(["-stream_loop".to_string(), "-1".to_string()]);
            }
            args.extend(["-t".to_string(), dur]);
            args.push("-i".to_string());
            args.push(segment.input_path().to_string_lossy().to_string());
        }

        args.push("-i".to_string());
        args.push(audio.path().to_string_lossy().to_string());

        args.push("-filter_complex".to_string());
        args.push(self.build_filter_complex(timeline));
        args.extend(["-map", "[vout]", "-map", "[aout]"].iter().map(ToString::to_string));

        args.extend(["-c:v".to_string(), self.config.video_codec.clone()]);
        if let Some(ref preset) = self.config.preset {
            args.extend(["-preset".to_string(), preset.clone()]);
        }
        args.extend(["-pix_fmt", "yuv420p"].iter().map(ToString::to_string));
        args.extend(["-r".to_string(), self.config.fps.to_string()]);

        args.extend(["-c:a".to_string(), self.config.audio_codec.clone()]);
        if let Some(ref bitrate) = self.config.audio_bitrate {
            args.extend(["-b:a".to_string(), bitrate.clone()]);
        }

        args.extend(self.config.output_args.clone());

        args.extend(["-t".to_string(), secs(total)]);
        args.extend(["-movflags", "+faststart", "-f", "mp4"].iter().map(ToString::to_string));
        args.push(partial.to_string_lossy().to_string());

        EncodePlan {
            args,
            partial_path: partial,
            output_path: output.to_path_buf(),
            duration: total,
        }
    }

    /// Encode to `output`. Any previous file at `output` is removed first;
    /// on failure the partial file is removed as well.
    pub async fn assemble(
        &self,
        encoder: &dyn VideoEncoder,
        timeline: &Timeline,
        audio: &AudioTrack,
        output: &Path,
    ) -> Result<OutputVideo, EncodingError> {
        let plan = self.plan(timeline, audio, output);

        remove_if_exists(&plan.output_path).await?;
        remove_if_exists(&plan.partial_path).await?;

        info!(
            "Encoding {} segments ({:.1}s) to {}",
            timeline.len(),
            plan.duration.as_secs_f64(),
            output.display()
        );

        if let Err(e) = encoder.encode(&plan).await {
            if let Err(cleanup) = remove_if_exists(&plan.partial_path).await {
                warn!("Could not remove {}: {cleanup}", plan.partial_path.display());
            }
            return Err(e);
        }

        if !fs::try_exists(&plan.partial_path).await.unwrap_or(false) {
            return Err(EncodingError::MissingOutput(
                plan.partial_path.display().to_string(),
            ));
        }
        fs::rename(&plan.partial_path, &plan.output_path).await?;

        let (width, height) = RESOLUTION;
        Ok(OutputVideo {
            path: plan.output_path,
            width,
            height,
            video_codec: self.config.video_codec.clone(),
            audio_codec: self.config.audio_codec.clone(),
            duration: plan.duration,
        })
    }
}

/// Remove a file, treating "already gone" as success.
pub(crate) async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
