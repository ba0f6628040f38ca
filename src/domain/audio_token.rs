/// A single recognized token with its diarization label, as produced by the
/// ASR backend. Times are seconds from the start of the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioToken {
    pub text: String,
    pub speaker_id: String,
    pub start_time: f64,
    pub end_time: f64,
}
