use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::AudioToken;

/// Request options forwarded to the ASR vendor.
#[derive(Debug, Clone)]
pub struct AsrConfig {
    pub language: String,
    pub diarization: bool,
    /// Optional (min, max) speaker-count hint for the diarizer.
    pub speaker_count_hint: Option<(u32, u32)>,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            language: "ko-KR".to_string(),
            diarization: true,
            speaker_count_hint: None,
        }
    }
}

/// Raw output of a completed transcription job.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionPayload {
    /// Untokenized full transcript, when the vendor provides one.
    pub full_transcript: Option<String>,
    /// Time-ordered diarized tokens.
    pub tokens: Vec<AudioToken>,
}

/// Outcome of an accepted submission. Async vendors hand back a job id to
/// poll; sync vendors may return the finished transcription inline.
#[derive(Debug, Clone)]
pub enum Submission {
    Job(String),
    Inline(TranscriptionPayload),
}

/// One poll observation of an async transcription job.
#[derive(Debug, Clone)]
pub enum PollUpdate {
    /// Not finished yet; carries the raw vendor status for logging.
    Pending { status: String },
    Completed(TranscriptionPayload),
    /// Terminal vendor-side failure; the raw status distinguishes
    /// transcription errors from unreadable-file errors.
    Failed { status: String },
}

/// Asynchronous speech-recognition backend supporting both submission
/// shapes: a URL the vendor fetches itself, and a direct multipart upload.
#[async_trait]
pub trait AsrBackend: Send + Sync {
    async fn submit_url(
        &self,
        audio_url: &str,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError>;

    async fn submit_file(
        &self,
        audio: Bytes,
        filename: &str,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError>;

    async fn poll(&self, job_id: &str) -> Result<PollUpdate, AsrBackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AsrBackendError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("response carried no job id")]
    MissingJobId,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
