use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{AsrConfig, MediaStore, Submission};
use crate::application::services::{
    AnalysisFanout, AudioDeliveryResolver, AudioInput, DeliveryError, PollConfig, SegmentBuilder,
    TranscriptionClientError, TranscriptionJobClient,
};
use crate::domain::PipelineResult;

/// Broad failure class of a pipeline run, for callers that map errors to
/// transport semantics without matching on inner structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    Delivery,
    Submission,
    Transcription,
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("audio delivery: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionClientError),
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::Delivery(DeliveryError::Submission) => PipelineErrorKind::Submission,
            PipelineError::Delivery(_) => PipelineErrorKind::Delivery,
            PipelineError::Transcription(TranscriptionClientError::Timeout { .. })
            | PipelineError::Transcription(TranscriptionClientError::DeadlineExceeded) => {
                PipelineErrorKind::Timeout
            }
            PipelineError::Transcription(_) => PipelineErrorKind::Transcription,
        }
    }
}

/// Sequences delivery, polling, segmentation, and analysis, and owns the
/// top-level failure policy: no transcript aborts the run, degraded
/// analysis does not.
pub struct PipelineService {
    resolver: AudioDeliveryResolver,
    job_client: TranscriptionJobClient,
    segment_builder: SegmentBuilder,
    analysis: AnalysisFanout,
    media_store: Arc<dyn MediaStore>,
    asr_config: AsrConfig,
    poll_config: PollConfig,
    run_timeout: Option<Duration>,
}

impl PipelineService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: AudioDeliveryResolver,
        job_client: TranscriptionJobClient,
        segment_builder: SegmentBuilder,
        analysis: AnalysisFanout,
        media_store: Arc<dyn MediaStore>,
        asr_config: AsrConfig,
        poll_config: PollConfig,
        run_timeout: Option<Duration>,
    ) -> Self {
        Self {
            resolver,
            job_client,
            segment_builder,
            analysis,
            media_store,
            asr_config,
            poll_config,
            run_timeout,
        }
    }

    pub async fn run(&self, input: AudioInput) -> Result<PipelineResult, PipelineError> {
        let deadline = self.run_timeout.map(|t| Instant::now() + t);

        let result = self.run_inner(&input, deadline).await;

        // Staged audio is deleted on both success and failure paths;
        // cleanup problems are logged, never escalated.
        if let Some(path) = input.staged_path() {
            if let Err(e) = self.media_store.delete(path).await {
                tracing::warn!(error = %e, path = %path, "Failed to delete staged audio");
            }
        }

        result
    }

    async fn run_inner(
        &self,
        input: &AudioInput,
        deadline: Option<Instant>,
    ) -> Result<PipelineResult, PipelineError> {
        let submission = self.resolver.resolve(input, &self.asr_config).await?;

        let payload = match submission {
            Submission::Inline(payload) => payload,
            Submission::Job(job_id) => {
                self.job_client
                    .await_result(&job_id, &self.poll_config, deadline)
                    .await?
            }
        };

        let (segments, speakers) = self.segment_builder.build(&payload);
        tracing::info!(
            segments = segments.len(),
            speakers = speakers.len(),
            "Transcript segmented"
        );

        let analysis = self.analysis.analyze(&segments, &speakers, deadline).await;
        if analysis.is_degraded() {
            tracing::warn!("One or more analysis sections fell back to default content");
        }

        Ok(PipelineResult {
            segments,
            speakers,
            analysis,
        })
    }
}
