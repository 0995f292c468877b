//! Media probing via ffprobe

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe failed: {0}")]
    Failed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no duration reported for {0}")]
    MissingDuration(String),
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

/// Measure the container duration of a media file, in seconds.
pub async fn duration_secs(ffprobe_path: &str, path: &Path) -> Result<f64, ProbeError> {
    let output = Command::new(ffprobe_path)
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .await
        .map_err(|source| ProbeError::Spawn {
            tool: ffprobe_path.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::Failed(stderr.trim().to_string()));
    }

    parse_duration(&output.stdout)?
        .ok_or_else(|| ProbeError::MissingDuration(path.display().to_string()))
}

/// Extract `format.duration` from ffprobe JSON output.
fn parse_duration(json: &[u8]) -> Result<Option<f64>, serde_json::Error> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite()))
}

/// Check whether a tool responds to `-version`.
pub async fn tool_available(path: &str) -> bool {
    Command::new(path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
