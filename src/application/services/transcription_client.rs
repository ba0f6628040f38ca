use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{AsrBackend, AsrBackendError, PollUpdate, TranscriptionPayload};
use crate::domain::{TranscriptionJob, TranscriptionStatus};

/// Poll cadence for an async transcription job. Bounded attempts at a fixed
/// interval cap worst-case latency; callers tune both to their handling
/// context.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 9,
            interval: Duration::from_secs(6),
        }
    }
}

/// Drives a submitted transcription job to a terminal state.
pub struct TranscriptionJobClient {
    backend: Arc<dyn AsrBackend>,
}

impl TranscriptionJobClient {
    pub fn new(backend: Arc<dyn AsrBackend>) -> Self {
        Self { backend }
    }

    /// Polls until the job reaches a terminal status, the attempt budget is
    /// exhausted, or the deadline passes. Issues at most
    /// `config.max_attempts` polls and never sleeps after the final one.
    pub async fn await_result(
        &self,
        job_id: &str,
        config: &PollConfig,
        deadline: Option<Instant>,
    ) -> Result<TranscriptionPayload, TranscriptionClientError> {
        let mut job = TranscriptionJob::new(job_id);

        for attempt in 1..=config.max_attempts {
            if let Some(d) = deadline {
                if Instant::now() >= d {
                    return Err(TranscriptionClientError::DeadlineExceeded);
                }
            }

            let update = self.backend.poll(job_id).await?;

            match update {
                PollUpdate::Completed(payload) => {
                    job.status = TranscriptionStatus::Transcribed;
                    tracing::info!(
                        job_id = %job.job_id,
                        attempt = attempt,
                        elapsed_ms = (chrono::Utc::now() - job.created_at).num_milliseconds(),
                        tokens = payload.tokens.len(),
                        "Transcription completed"
                    );
                    return Ok(payload);
                }
                PollUpdate::Failed { status } => {
                    job.status = TranscriptionStatus::Error;
                    tracing::warn!(
                        job_id = %job.job_id,
                        status = %status,
                        "Transcription reported a terminal failure"
                    );
                    return Err(TranscriptionClientError::TranscriptionFailed { status });
                }
                PollUpdate::Pending { status } => {
                    job.status = TranscriptionStatus::Processing;
                    tracing::debug!(
                        job_id = %job.job_id,
                        attempt = attempt,
                        max_attempts = config.max_attempts,
                        status = %status,
                        "Transcription still pending"
                    );
                }
            }

            if attempt < config.max_attempts {
                match deadline {
                    Some(d) => {
                        let next = Instant::now() + config.interval;
                        tokio::time::sleep_until(next.min(d)).await;
                    }
                    None => tokio::time::sleep(config.interval).await,
                }
            }
        }

        Err(TranscriptionClientError::Timeout {
            attempts: config.max_attempts,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionClientError {
    #[error("transcription failed with status {status}")]
    TranscriptionFailed { status: String },
    #[error("no result after {attempts} poll attempts")]
    Timeout { attempts: u32 },
    #[error("run deadline exceeded while awaiting transcription")]
    DeadlineExceeded,
    #[error("poll request failed: {0}")]
    Backend(#[from] AsrBackendError),
}
