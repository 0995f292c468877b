//! Stock footage from the Pexels video API
//!
//! One search per configured query; the first result's HD rendition is
//! downloaded as the clip for that slot. Queries that find nothing become
//! title slides. If no query yields a clip at all, the producer fails with
//! [`FootageUnavailableError`] and the caller switches to text slides.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::slides::{title_case, TextSlideProducer};
use super::{VisualError, VisualSegment};
use crate::config::FootageConfig;

/// Stock footage could not be obtained. Recoverable: the run falls back
/// to text slides.
#[derive(Error, Debug)]
pub enum FootageUnavailableError {
    #[error("footage provider rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("footage provider returned HTTP {0}")]
    Status(u16),

    #[error("no footage found for any of {0} queries")]
    NoResults(usize),

    #[error("footage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error while saving footage: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloadable search result.
#[derive(Debug, Clone, PartialEq)]
pub struct FootageHit {
    pub id: u64,
    pub url: String,
    pub duration_secs: f64,
}

/// Footage-search collaborator.
#[async_trait]
pub trait FootageSearch: Send + Sync {
    /// Search for clips matching `query`, best match first.
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<FootageHit>, FootageUnavailableError>;

    /// Download a clip to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), FootageUnavailableError>;
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    #[serde(default)]
    quality: Option<String>,
    link: String,
}

impl PexelsVideo {
    /// HD rendition if present, otherwise the first file.
    fn preferred_file(&self) -> Option<&PexelsVideoFile> {
        self.video_files
            .iter()
            .find(|f| f.quality.as_deref() == Some("hd"))
            .or_else(|| self.video_files.first())
    }
}

fn hits_from_response(response: PexelsSearchResponse) -> Vec<FootageHit> {
    response
        .videos
        .iter()
        .filter_map(|video| {
            video.preferred_file().map(|file| FootageHit {
                id: video.id,
                url: file.link.clone(),
                duration_secs: video.duration,
            })
        })
        .collect()
}

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Pexels video search client
pub struct PexelsClient {
    client: Client,
    api_key: String,
    endpoint: String,
    search_timeout: Duration,
}

impl PexelsClient {
    pub fn new(api_key: &str, config: &FootageConfig) -> Result<Self, FootageUnavailableError> {
        // Downloads may run long; only stalls count against the timeout.
        let client = Client::builder()
            .user_agent(concat!("beanflow/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: config.endpoint.clone(),
            search_timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl FootageSearch for PexelsClient {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<FootageHit>, FootageUnavailableError> {
        let per_page = per_page.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Authorization", &self.api_key)
            .timeout(self.search_timeout)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(FootageUnavailableError::Unauthorized(resp.status().as_u16()));
            }
            status if !status.is_success() => {
                return Err(FootageUnavailableError::Status(status.as_u16()));
            }
            _ => {}
        }

        let data: PexelsSearchResponse = resp.json().await?;
        Ok(hits_from_response(data))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), FootageUnavailableError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FootageUnavailableError::Status(resp.status().as_u16()));
        }

        match write_body(resp, dest).await {
            Ok(total) => {
                debug!("Downloaded {total} bytes to {}", dest.display());
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(dest).await {
                    debug!("Could not remove {}: {cleanup}", dest.display());
                }
                Err(e)
            }
        }
    }
}

/// Stream a response body into `dest`, returning the byte count.
async fn write_body(
    resp: reqwest::Response,
    dest: &Path,
) -> Result<usize, FootageUnavailableError> {
    let mut file = File::create(dest).await?;
    let mut stream = resp.bytes_stream();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        total += chunk.len();
    }
    file.flush().await?;

    Ok(total)
}

/// Produces one footage clip per configured query.
pub struct StockFootageProducer {
    search: Box<dyn FootageSearch>,
    config: FootageConfig,
    slides: TextSlideProducer,
}

impl StockFootageProducer {
    pub fn new(
        search: Box<dyn FootageSearch>,
        config: FootageConfig,
        slides: TextSlideProducer,
    ) -> Self {
        Self {
            search,
            config,
            slides,
        }
    }

    pub fn slides(&self) -> &TextSlideProducer {
        &self.slides
    }

    async fn fetch_clip(
        &self,
        index: usize,
        query: &str,
        work_dir: &Path,
    ) -> Result<Option<VisualSegment>, FootageUnavailableError> {
        let hits = self.search.search(query, self.config.per_page).await?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let path = work_dir.join(format!("clip_{index:03}.mp4"));
        self.search.download(&hit.url, &path).await?;
        debug!("Clip {index}: pexels video {} ({}s)", hit.id, hit.duration_secs);

        Ok(Some(VisualSegment::clip(query, path, hit.duration_secs)))
    }

    /// Search and download clips into `work_dir`.
    pub async fn produce(&self, work_dir: &Path) -> Result<Vec<VisualSegment>, VisualError> {
        let queries: Vec<&String> = self
            .config
            .queries
            .iter()
            .take(self.config.max_clips)
            .collect();

        let mut segments = Vec::with_capacity(queries.len());
        let mut clips = 0;

        for (index, query) in queries.iter().enumerate() {
            info!("Searching for: {query}");
            match self.fetch_clip(index, query, work_dir).await {
                Ok(Some(segment)) => {
                    clips += 1;
                    segments.push(segment);
                    continue;
                }
                Ok(None) => debug!("No footage for '{query}'"),
                Err(e @ FootageUnavailableError::Unauthorized(_)) => return Err(e.into()),
                Err(e) => warn!("Footage for '{query}' failed: {e}"),
            }

            segments.push(self.slides.render_slide(
                &title_case(query),
                1.0,
                work_dir.join(format!("slide_{index:03}.png")),
            )?);
        }

        if clips == 0 {
            return Err(FootageUnavailableError::NoResults(queries.len()).into());
        }

        info!("Collected {clips} clips for {} queries", queries.len());
        Ok(segments)
    }
}
