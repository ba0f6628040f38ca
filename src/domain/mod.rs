mod analysis;
mod audio_token;
mod pipeline_result;
mod speaker;
mod transcript_segment;
mod transcription_job;

pub use analysis::{
    AnalysisOutcome, AnalysisResult, CriterionScore, InteractionAnalysis, OverallAnalysis,
    SpeakerAnalysis,
};
pub use audio_token::AudioToken;
pub use pipeline_result::PipelineResult;
pub use speaker::{Speaker, DEFAULT_SPEAKER_ID, FALLBACK_COLOR, SPEAKER_PALETTE};
pub use transcript_segment::TranscriptSegment;
pub use transcription_job::{TranscriptionJob, TranscriptionStatus};
