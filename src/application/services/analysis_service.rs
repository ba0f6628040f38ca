use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::application::ports::GenerativeClient;
use crate::domain::{
    AnalysisOutcome, AnalysisResult, CriterionScore, InteractionAnalysis, OverallAnalysis,
    Speaker, SpeakerAnalysis, TranscriptSegment,
};

const OVERALL_CRITERIA: [&str; 5] = [
    "Communication clarity",
    "Active listening",
    "Meeting efficiency",
    "Problem solving",
    "Cooperation",
];

const SPEAKER_CRITERIA: [&str; 5] = [
    "Clarity",
    "Logical coherence",
    "Engagement",
    "Expertise",
    "Composure",
];

const INTERACTION_CRITERIA: [&str; 5] = [
    "Interaction frequency",
    "Participation balance",
    "Mutual respect",
    "Cooperativeness",
    "Conflict resolution",
];

const UNAVAILABLE_FEEDBACK: &str = "Analysis is unavailable for this criterion.";

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Transcript prefix cap, in segments. A cost guard for long
    /// recordings, not a correctness constraint.
    pub max_segments: usize,
    /// Per-call guard so one slow evaluation cannot stall the fanout.
    pub call_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_segments: 50,
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs the three-part qualitative evaluation. Every section always comes
/// back structurally valid: a failing, slow, or malformed model call
/// degrades that section to its fixed default record and nothing else.
pub struct AnalysisFanout {
    client: Arc<dyn GenerativeClient>,
    config: AnalysisConfig,
}

impl AnalysisFanout {
    pub fn new(client: Arc<dyn GenerativeClient>, config: AnalysisConfig) -> Self {
        Self { client, config }
    }

    /// Dispatches the overall, interaction, and per-speaker evaluations
    /// concurrently and collects each outcome independently.
    pub async fn analyze(
        &self,
        segments: &[TranscriptSegment],
        speakers: &[Speaker],
        deadline: Option<Instant>,
    ) -> AnalysisResult {
        let limited = &segments[..segments.len().min(self.config.max_segments)];

        let conversation_text = limited
            .iter()
            .map(|seg| {
                let name = speakers
                    .iter()
                    .find(|s| s.id == seg.speaker_id)
                    .map(|s| s.display_name.as_str())
                    .unwrap_or(seg.speaker_id.as_str());
                format!("{}: {}", name, seg.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let speaker_texts: BTreeMap<&str, String> = speakers
            .iter()
            .map(|speaker| {
                let text = limited
                    .iter()
                    .filter(|seg| seg.speaker_id == speaker.id)
                    .map(|seg| seg.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                (speaker.id.as_str(), text)
            })
            .collect();

        let speaker_futures = speakers.iter().map(|speaker| {
            let text = speaker_texts
                .get(speaker.id.as_str())
                .map(String::as_str)
                .unwrap_or("");
            async move {
                let outcome = self
                    .evaluate_speaker(text, &speaker.display_name, deadline)
                    .await;
                (speaker.id.clone(), outcome)
            }
        });

        let (overall, interaction, speaker_entries) = tokio::join!(
            self.evaluate_overall(&conversation_text, deadline),
            self.evaluate_interaction(&conversation_text, speakers.len(), deadline),
            join_all(speaker_futures),
        );

        AnalysisResult {
            overall,
            speakers: speaker_entries.into_iter().collect(),
            interaction,
        }
    }

    pub async fn evaluate_overall(
        &self,
        conversation_text: &str,
        deadline: Option<Instant>,
    ) -> AnalysisOutcome<OverallAnalysis> {
        let prompt = overall_prompt(conversation_text);
        self.evaluate("overall", &prompt, default_overall(), deadline)
            .await
    }

    /// Speakers with no recorded text get the default record without a
    /// model round-trip.
    pub async fn evaluate_speaker(
        &self,
        speaker_text: &str,
        speaker_name: &str,
        deadline: Option<Instant>,
    ) -> AnalysisOutcome<SpeakerAnalysis> {
        if speaker_text.trim().is_empty() {
            return AnalysisOutcome::fallback(default_speaker(speaker_name));
        }
        let prompt = speaker_prompt(speaker_text, speaker_name);
        self.evaluate("speaker", &prompt, default_speaker(speaker_name), deadline)
            .await
    }

    pub async fn evaluate_interaction(
        &self,
        conversation_text: &str,
        speaker_count: usize,
        deadline: Option<Instant>,
    ) -> AnalysisOutcome<InteractionAnalysis> {
        let prompt = interaction_prompt(conversation_text, speaker_count);
        self.evaluate("interaction", &prompt, default_interaction(), deadline)
            .await
    }

    async fn evaluate<T: DeserializeOwned>(
        &self,
        section: &'static str,
        prompt: &str,
        fallback: T,
        deadline: Option<Instant>,
    ) -> AnalysisOutcome<T> {
        let mut limit = self.config.call_timeout;
        if let Some(d) = deadline {
            limit = limit.min(d.saturating_duration_since(Instant::now()));
        }

        match tokio::time::timeout(limit, self.client.generate(prompt)).await {
            Ok(Ok(text)) => match parse_model_json::<T>(&text) {
                Ok(value) => AnalysisOutcome::computed(value),
                Err(e) => {
                    tracing::warn!(
                        section = section,
                        error = %e,
                        "Model response was not parseable; using fallback"
                    );
                    AnalysisOutcome::fallback(fallback)
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(section = section, error = %e, "Generative call failed; using fallback");
                AnalysisOutcome::fallback(fallback)
            }
            Err(_) => {
                tracing::warn!(section = section, "Generative call timed out; using fallback");
                AnalysisOutcome::fallback(fallback)
            }
        }
    }
}

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(?:json)?\n?").unwrap());
static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Extracts the first JSON-object-shaped substring from free-form model
/// output (code fences stripped) and parses it. Generative responses are
/// not format-guaranteed; anything unparseable is the caller's cue to fall
/// back.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let cleaned = FENCE_RE.replace_all(text, "");
    let cleaned = cleaned.trim();

    match OBJECT_RE.find(cleaned) {
        Some(m) => serde_json::from_str(m.as_str()),
        None => serde_json::from_str(cleaned),
    }
}

fn neutral(name: &str) -> CriterionScore {
    CriterionScore {
        name: name.to_string(),
        score: 0.5,
        feedback: UNAVAILABLE_FEEDBACK.to_string(),
    }
}

pub fn default_overall() -> OverallAnalysis {
    OverallAnalysis {
        criteria: OVERALL_CRITERIA.iter().map(|n| neutral(n)).collect(),
        summary: "A temporary error prevented a detailed evaluation of this conversation."
            .to_string(),
    }
}

pub fn default_speaker(speaker_name: &str) -> SpeakerAnalysis {
    SpeakerAnalysis {
        criteria: SPEAKER_CRITERIA.iter().map(|n| neutral(n)).collect(),
        summary: format!(
            "Not enough data was collected to evaluate {}.",
            speaker_name
        ),
        strengths: vec!["-".to_string()],
        improvements: vec!["-".to_string()],
    }
}

pub fn default_interaction() -> InteractionAnalysis {
    InteractionAnalysis {
        criteria: INTERACTION_CRITERIA.iter().map(|n| neutral(n)).collect(),
        summary: "The interaction pattern could not be analyzed.".to_string(),
        recommendations: vec!["Please try again later.".to_string()],
    }
}

fn overall_prompt(conversation_text: &str) -> String {
    format!(
        r#"The following is a recorded meeting conversation. Evaluate it against these criteria:
1. Communication clarity: how clearly the speakers expressed their points
2. Active listening: whether the speakers heard and responded to each other
3. Meeting efficiency: whether the discussion progressed efficiently
4. Problem solving: whether problems were raised and addressed appropriately
5. Cooperation: whether the speakers worked together constructively

Give each criterion a score between 0.0 and 1.0 with short feedback, then
summarize the conversation as a whole. Keep the tone polite and constructive.

Respond with JSON only:
{{
  "criteria": [
    {{ "name": "Communication clarity", "score": 0.8, "feedback": "..." }},
    ...
  ],
  "summary": "..."
}}

Conversation:
{conversation_text}
"#
    )
}

fn speaker_prompt(speaker_text: &str, speaker_name: &str) -> String {
    format!(
        r#"The following are the recorded statements of "{speaker_name}". Analyze their speaking style and characteristics:
1. Clarity
2. Logical coherence
3. Engagement
4. Expertise
5. Composure

Give each criterion a score between 0.0 and 1.0 with feedback, and list
strengths and areas for improvement. Keep the tone polite.

Respond with JSON only:
{{
  "criteria": [...],
  "summary": "...",
  "strengths": ["...", "..."],
  "improvements": ["...", "..."]
}}

Statements by {speaker_name}:
{speaker_text}
"#
    )
}

fn interaction_prompt(conversation_text: &str, speaker_count: usize) -> String {
    format!(
        r#"This is a conversation between {speaker_count} speakers. Analyze how they interacted:
1. Interaction frequency
2. Participation balance
3. Mutual respect
4. Cooperativeness
5. Conflict resolution

Give each criterion a score between 0.0 and 1.0 with feedback, plus
recommendations for improvement. Keep the tone polite.

Respond with JSON only:
{{
  "criteria": [...],
  "summary": "...",
  "recommendations": ["...", "..."]
}}

Conversation:
{conversation_text}
"#
    )
}
