use serde::Serialize;

use super::{AnalysisResult, Speaker, TranscriptSegment};

/// Everything a moderator sees for one processed recording. Transient:
/// returned to the caller, never retained by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    #[serde(rename = "transcript")]
    pub segments: Vec<TranscriptSegment>,
    pub speakers: Vec<Speaker>,
    pub analysis: AnalysisResult,
}
