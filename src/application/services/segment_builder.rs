use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::application::ports::TranscriptionPayload;
use crate::domain::{AudioToken, Speaker, TranscriptSegment, DEFAULT_SPEAKER_ID};

/// Placeholder text for recordings the backend produced nothing for.
pub const NO_RESULT_TEXT: &str = "No speech was recognized in this recording.";

/// Derives a display name from a raw diarization speaker id.
pub trait SpeakerNamer: Send + Sync {
    fn display_name(&self, speaker_id: &str) -> String;
}

/// Default namer: numeric ids become "Speaker N"; non-numeric ids from
/// other backend variants are kept verbatim rather than collapsed.
pub struct NumericSpeakerNamer;

impl SpeakerNamer for NumericSpeakerNamer {
    fn display_name(&self, speaker_id: &str) -> String {
        match speaker_id.trim().parse::<u64>() {
            Ok(n) => format!("Speaker {}", n),
            Err(_) => format!("Speaker {}", speaker_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Minimum tokens a streak needs before it is emitted as a segment.
    /// Streaks below the threshold are treated as diarization noise.
    pub min_streak_tokens: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_streak_tokens: 2,
        }
    }
}

/// Merges the flat per-token speaker-label stream into coherent speaker
/// turns. Never fails: malformed input degrades to a single placeholder
/// segment, since a partial transcript beats a hard failure mid-pipeline.
pub struct SegmentBuilder {
    config: SegmenterConfig,
    namer: Arc<dyn SpeakerNamer>,
}

struct Streak {
    speaker_id: String,
    text: String,
    start_time: f64,
    end_time: f64,
    token_count: usize,
}

impl Streak {
    fn open(token: &AudioToken) -> Self {
        Self {
            speaker_id: token.speaker_id.clone(),
            text: token.text.clone(),
            start_time: token.start_time,
            end_time: token.end_time,
            token_count: 1,
        }
    }

    fn extend(&mut self, token: &AudioToken) {
        self.text.push_str(&token.text);
        self.end_time = token.end_time;
        self.token_count += 1;
    }
}

impl SegmentBuilder {
    pub fn new(config: SegmenterConfig, namer: Arc<dyn SpeakerNamer>) -> Self {
        Self { config, namer }
    }

    pub fn build(&self, payload: &TranscriptionPayload) -> (Vec<TranscriptSegment>, Vec<Speaker>) {
        match catch_unwind(AssertUnwindSafe(|| self.build_inner(payload))) {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Segment merge panicked; falling back to a single segment");
                self.fallback(payload)
            }
        }
    }

    fn build_inner(&self, payload: &TranscriptionPayload) -> (Vec<TranscriptSegment>, Vec<Speaker>) {
        if payload.tokens.is_empty() {
            return self.fallback(payload);
        }

        let mut segments: Vec<TranscriptSegment> = Vec::new();
        let mut current: Option<Streak> = None;

        for token in &payload.tokens {
            match current.as_mut() {
                Some(streak) if streak.speaker_id == token.speaker_id => streak.extend(token),
                _ => {
                    if let Some(finished) = current.take() {
                        self.close(finished, &mut segments);
                    }
                    current = Some(Streak::open(token));
                }
            }
        }
        if let Some(finished) = current.take() {
            self.close(finished, &mut segments);
        }

        // Every streak can be rejected as noise; degrade rather than hand
        // the caller an empty transcript.
        if segments.is_empty() {
            return self.fallback(payload);
        }

        let speakers = self.speakers_for(&segments);
        (segments, speakers)
    }

    fn close(&self, streak: Streak, segments: &mut Vec<TranscriptSegment>) {
        let text = streak.text.trim();
        if streak.token_count < self.config.min_streak_tokens || text.is_empty() {
            tracing::debug!(
                speaker = %streak.speaker_id,
                tokens = streak.token_count,
                "Dropping sub-threshold streak"
            );
            return;
        }
        segments.push(TranscriptSegment {
            speaker_id: streak.speaker_id,
            text: text.to_string(),
            start_time: streak.start_time,
            end_time: streak.end_time,
        });
    }

    /// Speakers are exactly the ids present in emitted segments, in order
    /// of first appearance — never observed-but-dropped ids.
    fn speakers_for(&self, segments: &[TranscriptSegment]) -> Vec<Speaker> {
        let mut speakers: Vec<Speaker> = Vec::new();
        for segment in segments {
            if speakers.iter().any(|s| s.id == segment.speaker_id) {
                continue;
            }
            speakers.push(Speaker {
                id: segment.speaker_id.clone(),
                display_name: self.namer.display_name(&segment.speaker_id),
                color_hex: Speaker::color_for(&segment.speaker_id).to_string(),
            });
        }
        speakers
    }

    fn fallback(&self, payload: &TranscriptionPayload) -> (Vec<TranscriptSegment>, Vec<Speaker>) {
        let (text, end_time) = match payload.full_transcript.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => (t.to_string(), 10.0),
            _ => (NO_RESULT_TEXT.to_string(), 1.0),
        };

        let segments = vec![TranscriptSegment {
            speaker_id: DEFAULT_SPEAKER_ID.to_string(),
            text,
            start_time: 0.0,
            end_time,
        }];
        let speakers = self.speakers_for(&segments);
        (segments, speakers)
    }
}
