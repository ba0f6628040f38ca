use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::application::ports::{AsrBackend, AsrBackendError, AsrConfig, Submission};

/// Reference to the audio a caller wants transcribed.
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Caller-hosted URL the ASR backend may be able to fetch directly.
    Url(String),
    /// Audio staged in the media store by the upload handler.
    Staged { path: String, url: String },
}

impl AudioInput {
    pub fn url(&self) -> &str {
        match self {
            AudioInput::Url(url) => url,
            AudioInput::Staged { url, .. } => url,
        }
    }

    pub fn staged_path(&self) -> Option<&str> {
        match self {
            AudioInput::Url(_) => None,
            AudioInput::Staged { path, .. } => Some(path),
        }
    }
}

/// One way of getting audio in front of the ASR backend. Strategies are
/// tried in order; a successful delivery yields the accepted submission.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(
        &self,
        input: &AudioInput,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError>;
}

/// Submits the audio as a URL reference after normalizing the link.
pub struct UrlDelivery {
    backend: Arc<dyn AsrBackend>,
}

impl UrlDelivery {
    pub fn new(backend: Arc<dyn AsrBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl DeliveryStrategy for UrlDelivery {
    fn name(&self) -> &'static str {
        "url-reference"
    }

    async fn deliver(
        &self,
        input: &AudioInput,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError> {
        let url = normalize_audio_url(input.url());
        tracing::debug!(url = %url, "Submitting audio by URL reference");
        self.backend.submit_url(&url, config).await
    }
}

/// Downloads the audio bytes (bounded timeout and size cap) and resubmits
/// them as a multipart upload.
pub struct DownloadUpload {
    backend: Arc<dyn AsrBackend>,
    http: reqwest::Client,
    download_timeout: Duration,
    max_bytes: u64,
}

impl DownloadUpload {
    pub fn new(backend: Arc<dyn AsrBackend>, download_timeout: Duration, max_bytes: u64) -> Self {
        Self {
            backend,
            http: reqwest::Client::new(),
            download_timeout,
            max_bytes,
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, AsrBackendError> {
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("download: {}", e)))?;

        if !response.status().is_success() {
            return Err(AsrBackendError::ApiRequestFailed(format!(
                "download status {}",
                response.status()
            )));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(AsrBackendError::ApiRequestFailed(format!(
                    "audio too large: {} bytes (cap {})",
                    len, self.max_bytes
                )));
            }
        }

        let mut stream = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| AsrBackendError::ApiRequestFailed(format!("download: {}", e)))?;
            if buf.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(AsrBackendError::ApiRequestFailed(format!(
                    "audio too large: exceeded {} byte cap",
                    self.max_bytes
                )));
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(buf))
    }
}

#[async_trait]
impl DeliveryStrategy for DownloadUpload {
    fn name(&self) -> &'static str {
        "download-upload"
    }

    async fn deliver(
        &self,
        input: &AudioInput,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError> {
        let url = normalize_audio_url(input.url());
        let data = self.download(&url).await?;
        let filename = filename_from_url(&url);
        tracing::debug!(
            bytes = data.len(),
            filename = %filename,
            "Resubmitting downloaded audio as multipart upload"
        );
        self.backend.submit_file(data, &filename, config).await
    }
}

/// Tries each delivery strategy in order; the first accepted submission
/// wins. Rejections accumulate for diagnostics, and a response without a
/// job id aborts the chain outright since no transport change can fix a
/// protocol-level defect.
pub struct AudioDeliveryResolver {
    strategies: Vec<Box<dyn DeliveryStrategy>>,
}

impl AudioDeliveryResolver {
    pub fn new(strategies: Vec<Box<dyn DeliveryStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn resolve(
        &self,
        input: &AudioInput,
        config: &AsrConfig,
    ) -> Result<Submission, DeliveryError> {
        let mut attempts: Vec<String> = Vec::new();

        for strategy in &self.strategies {
            match strategy.deliver(input, config).await {
                Ok(submission) => {
                    match &submission {
                        Submission::Job(job_id) => tracing::info!(
                            strategy = strategy.name(),
                            job_id = %job_id,
                            "Audio delivered"
                        ),
                        Submission::Inline(_) => tracing::info!(
                            strategy = strategy.name(),
                            "Audio delivered with inline result"
                        ),
                    }
                    return Ok(submission);
                }
                Err(AsrBackendError::MissingJobId) => {
                    return Err(DeliveryError::Submission);
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "Delivery strategy failed"
                    );
                    attempts.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        Err(DeliveryError::Exhausted {
            attempts: attempts.join("; "),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("all delivery strategies failed: {attempts}")]
    Exhausted { attempts: String },
    #[error("backend accepted the submission but returned no job id")]
    Submission,
}

/// Normalizes a download link so the backend receives raw bytes. Blob-store
/// download URLs serve an HTML wrapper unless `alt=media` is present, and
/// unescaped spaces break the vendor's fetcher.
pub fn normalize_audio_url(url: &str) -> String {
    let mut normalized = url.trim().replace(' ', "%20");
    if !normalized.contains("alt=media") {
        if normalized.contains('?') {
            normalized.push_str("&alt=media");
        } else {
            normalized.push_str("?alt=media");
        }
    }
    normalized
}

fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|base| base.rsplit('/').next())
        .filter(|name| !name.is_empty() && name.contains('.'))
        .map(|name| name.to_string())
        .unwrap_or_else(|| "audio.wav".to_string())
}
