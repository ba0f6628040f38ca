use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use colloquy::application::ports::{GenerativeClient, GenerativeError};
use colloquy::application::services::{
    default_interaction, default_overall, default_speaker, parse_model_json, AnalysisConfig,
    AnalysisFanout,
};
use colloquy::domain::{OverallAnalysis, Speaker, TranscriptSegment};

struct StubClient {
    response: String,
    calls: AtomicUsize,
}

impl StubClient {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GenerativeClient for StubClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

struct FailingClient;

#[async_trait::async_trait]
impl GenerativeClient for FailingClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerativeError> {
        Err(GenerativeError::ApiRequestFailed("boom".to_string()))
    }
}

fn fanout(client: Arc<dyn GenerativeClient>) -> AnalysisFanout {
    AnalysisFanout::new(client, AnalysisConfig::default())
}

fn segment(speaker_id: &str, text: &str, start: f64, end: f64) -> TranscriptSegment {
    TranscriptSegment {
        speaker_id: speaker_id.to_string(),
        text: text.to_string(),
        start_time: start,
        end_time: end,
    }
}

fn speaker(id: &str, name: &str) -> Speaker {
    Speaker {
        id: id.to_string(),
        display_name: name.to_string(),
        color_hex: "#3B82F6".to_string(),
    }
}

const VALID_OVERALL: &str = r#"{"criteria":[{"name":"Communication clarity","score":0.8,"feedback":"clear"}],"summary":"ok"}"#;

#[tokio::test]
async fn given_noise_response_when_evaluating_overall_then_documented_default_returned() {
    let client = StubClient::new("I'm sorry, I cannot evaluate that conversation.");
    let service = fanout(client);

    let outcome = service.evaluate_overall("A: hello", None).await;

    assert!(outcome.degraded);
    assert_eq!(outcome.value, default_overall());
}

#[tokio::test]
async fn given_noise_response_when_evaluating_speaker_then_documented_default_returned() {
    let client = StubClient::new("no json here");
    let service = fanout(client);

    let outcome = service.evaluate_speaker("hello there", "Speaker 1", None).await;

    assert!(outcome.degraded);
    assert_eq!(outcome.value, default_speaker("Speaker 1"));
}

#[tokio::test]
async fn given_noise_response_when_evaluating_interaction_then_documented_default_returned() {
    let client = StubClient::new("```\ntotally not json\n```");
    let service = fanout(client);

    let outcome = service.evaluate_interaction("A: hi\nB: hi", 2, None).await;

    assert!(outcome.degraded);
    assert_eq!(outcome.value, default_interaction());
}

#[tokio::test]
async fn given_fenced_json_response_when_evaluating_then_inner_object_parsed_unchanged() {
    let fenced = format!("```json\n{}\n```", VALID_OVERALL);
    let client = StubClient::new(&fenced);
    let service = fanout(client);

    let outcome = service.evaluate_overall("A: hello", None).await;

    assert!(!outcome.degraded);
    assert_eq!(outcome.value.summary, "ok");
    assert_eq!(outcome.value.criteria.len(), 1);
    assert_eq!(outcome.value.criteria[0].score, 0.8);
}

#[tokio::test]
async fn given_json_wrapped_in_prose_when_evaluating_then_object_still_extracted() {
    let wrapped = format!("Here is my evaluation:\n{}\nHope that helps!", VALID_OVERALL);
    let client = StubClient::new(&wrapped);
    let service = fanout(client);

    let outcome = service.evaluate_overall("A: hello", None).await;

    assert!(!outcome.degraded);
    assert_eq!(outcome.value.summary, "ok");
}

#[tokio::test]
async fn given_failing_client_when_evaluating_then_default_instead_of_error() {
    let service = fanout(Arc::new(FailingClient));

    let outcome = service.evaluate_overall("A: hello", None).await;

    assert!(outcome.degraded);
    assert_eq!(outcome.value, default_overall());
}

#[tokio::test]
async fn given_empty_speaker_text_when_evaluating_then_no_model_call_is_made() {
    let client = StubClient::new(VALID_OVERALL);
    let service = fanout(client.clone());

    let outcome = service.evaluate_speaker("   ", "Speaker 2", None).await;

    assert!(outcome.degraded);
    assert_eq!(outcome.value, default_speaker("Speaker 2"));
    assert_eq!(client.call_count(), 0);
}

#[test]
fn given_default_record_when_reparsed_then_unchanged() {
    let default = default_overall();
    let encoded = serde_json::to_string(&default).unwrap();

    let reparsed: OverallAnalysis = parse_model_json(&encoded).unwrap();

    assert_eq!(reparsed, default);

    // A second round trip must also be stable.
    let reencoded = serde_json::to_string(&reparsed).unwrap();
    let reparsed_again: OverallAnalysis = parse_model_json(&reencoded).unwrap();
    assert_eq!(reparsed_again, default);
}

#[tokio::test]
async fn given_failing_client_when_running_fanout_then_every_section_degrades() {
    let service = fanout(Arc::new(FailingClient));
    let segments = vec![
        segment("1", "We should ship on Friday.", 0.0, 2.0),
        segment("2", "Agreed, pending the review.", 2.0, 4.0),
    ];
    let speakers = vec![speaker("1", "Speaker 1"), speaker("2", "Speaker 2")];

    let result = service.analyze(&segments, &speakers, None).await;

    assert!(result.is_degraded());
    assert!(result.overall.degraded);
    assert!(result.interaction.degraded);
    assert_eq!(result.speakers.len(), 2);
    assert!(result.speakers.values().all(|s| s.degraded));
}

#[tokio::test]
async fn given_parseable_responses_when_running_fanout_then_sections_are_computed() {
    // A superset response parses for all three sections; each section's
    // deserializer ignores the fields it does not know.
    let full = r#"{
        "criteria":[{"name":"Clarity","score":0.9,"feedback":"good"}],
        "summary":"solid discussion",
        "strengths":["direct"],
        "improvements":["pacing"],
        "recommendations":["rotate facilitation"]
    }"#;
    let client = StubClient::new(full);
    let service = fanout(client.clone());
    let segments = vec![
        segment("1", "Status first, then blockers.", 0.0, 2.0),
        segment("2", "Sounds good.", 2.0, 3.0),
    ];
    let speakers = vec![speaker("1", "Speaker 1"), speaker("2", "Speaker 2")];

    let result = service.analyze(&segments, &speakers, None).await;

    assert!(!result.is_degraded());
    assert_eq!(result.overall.value.summary, "solid discussion");
    assert_eq!(result.speakers["1"].value.strengths, vec!["direct"]);
    assert_eq!(
        result.interaction.value.recommendations,
        vec!["rotate facilitation"]
    );
    // overall + interaction + one call per speaker with text
    assert_eq!(client.call_count(), 4);
}

#[tokio::test]
async fn given_speaker_without_segments_when_running_fanout_then_only_that_section_defaults() {
    let full = r#"{
        "criteria":[{"name":"Clarity","score":0.7,"feedback":"fine"}],
        "summary":"ok",
        "strengths":["focus"],
        "improvements":["brevity"],
        "recommendations":["share the floor"]
    }"#;
    let client = StubClient::new(full);
    let service = fanout(client.clone());
    let segments = vec![
        segment("1", "Doing all the talking here.", 0.0, 2.0),
        segment("1", "Still me.", 2.0, 4.0),
    ];
    let speakers = vec![speaker("1", "Speaker 1"), speaker("2", "Speaker 2")];

    let result = service.analyze(&segments, &speakers, None).await;

    assert!(!result.speakers["1"].degraded);
    assert!(result.speakers["2"].degraded);
    assert_eq!(result.speakers["2"].value, default_speaker("Speaker 2"));
}
