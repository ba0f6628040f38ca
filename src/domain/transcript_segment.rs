use serde::Serialize;

/// A coherent speaker turn built by merging consecutive same-speaker tokens.
///
/// Invariants upheld by the segment builder: `end_time >= start_time`, the
/// text is trimmed and non-empty, and segments are emitted in time order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    #[serde(rename = "speaker")]
    pub speaker_id: String,
    pub text: String,
    #[serde(rename = "start")]
    pub start_time: f64,
    #[serde(rename = "end")]
    pub end_time: f64,
}
