use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    AsrBackend, AsrBackendError, AsrConfig, PollUpdate, Submission, TranscriptionPayload,
};
use crate::domain::AudioToken;

const STATUS_TRANSCRIBED: &str = "transcribed";
const STATUS_TRANSCRIPT_ERROR: &str = "transcript_error";
const STATUS_FILE_ERROR: &str = "file_error";

/// Daglo-shaped async STT client: submit a job (URL reference or multipart
/// file), then poll the returned request id until a terminal status.
pub struct DagloClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DagloClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn transcripts_url(&self) -> String {
        format!("{}/stt/v1/async/transcripts", self.base_url)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    audio: AudioRef<'a>,
    stt_config: SttConfig<'a>,
}

#[derive(Serialize)]
struct AudioRef<'a> {
    source: AudioSource<'a>,
}

#[derive(Serialize)]
struct AudioSource<'a> {
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SttConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    speaker_diarization: DiarizationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiarizationConfig {
    enable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_speaker_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_speaker_count: Option<u32>,
}

impl<'a> SttConfig<'a> {
    fn from_config(config: &'a AsrConfig) -> Self {
        Self {
            language: (!config.language.is_empty()).then_some(config.language.as_str()),
            speaker_diarization: DiarizationConfig {
                enable: config.diarization,
                min_speaker_count: config.speaker_count_hint.map(|(min, _)| min),
                max_speaker_count: config.speaker_count_hint.map(|(_, max)| max),
            },
        }
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    rid: Option<String>,
    result: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollWire {
    status: String,
    #[serde(default)]
    stt_results: Vec<SttResultWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SttResultWire {
    transcript: Option<String>,
    #[serde(default)]
    words: Vec<WordWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordWire {
    word: Option<String>,
    speaker: Option<String>,
    start_time: Option<TimestampWire>,
    end_time: Option<TimestampWire>,
}

/// Proto-JSON timestamp: `seconds` arrives as a string or a number
/// depending on the serializer behind the API.
#[derive(Deserialize, Default)]
struct TimestampWire {
    #[serde(default)]
    seconds: serde_json::Value,
    #[serde(default)]
    nanos: i64,
}

impl TimestampWire {
    fn as_seconds(&self) -> f64 {
        let secs = match &self.seconds {
            serde_json::Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        };
        secs + self.nanos as f64 / 1_000_000_000.0
    }
}

fn submission_from(response: SubmitResponse) -> Result<Submission, AsrBackendError> {
    if response.result.as_deref() == Some("FAILED") {
        return Err(AsrBackendError::Rejected(
            response
                .message
                .unwrap_or_else(|| "backend reported failure".to_string()),
        ));
    }
    response
        .rid
        .map(Submission::Job)
        .ok_or(AsrBackendError::MissingJobId)
}

fn payload_from(wire: PollWire) -> TranscriptionPayload {
    let Some(first) = wire.stt_results.into_iter().next() else {
        return TranscriptionPayload::default();
    };

    let tokens = first
        .words
        .into_iter()
        .map(|w| AudioToken {
            text: w.word.unwrap_or_default(),
            speaker_id: w.speaker.unwrap_or_else(|| "1".to_string()),
            start_time: w.start_time.map(|t| t.as_seconds()).unwrap_or(0.0),
            end_time: w.end_time.map(|t| t.as_seconds()).unwrap_or(0.0),
        })
        .collect();

    TranscriptionPayload {
        full_transcript: first.transcript,
        tokens,
    }
}

#[async_trait]
impl AsrBackend for DagloClient {
    async fn submit_url(
        &self,
        audio_url: &str,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError> {
        let body = SubmitRequest {
            audio: AudioRef {
                source: AudioSource { url: audio_url },
            },
            stt_config: SttConfig::from_config(config),
        };

        tracing::debug!(url = %self.transcripts_url(), "Submitting transcription job by URL");

        let response = self
            .client
            .post(self.transcripts_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AsrBackendError::Rejected(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| AsrBackendError::InvalidResponse(format!("parse response: {}", e)))?;

        submission_from(parsed)
    }

    async fn submit_file(
        &self,
        audio: Bytes,
        filename: &str,
        config: &AsrConfig,
    ) -> Result<Submission, AsrBackendError> {
        let stt_config = serde_json::to_string(&SttConfig::from_config(config))
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("encode config: {}", e)))?;

        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("sttConfig", stt_config);

        let url = format!("{}/file", self.transcripts_url());
        tracing::debug!(url = %url, bytes = audio.len(), "Submitting transcription job as upload");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AsrBackendError::Rejected(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| AsrBackendError::InvalidResponse(format!("parse response: {}", e)))?;

        submission_from(parsed)
    }

    async fn poll(&self, job_id: &str) -> Result<PollUpdate, AsrBackendError> {
        let url = format!("{}/{}", self.transcripts_url(), job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AsrBackendError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AsrBackendError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let wire: PollWire = response
            .json()
            .await
            .map_err(|e| AsrBackendError::InvalidResponse(format!("parse response: {}", e)))?;

        if wire.status == STATUS_TRANSCRIBED {
            return Ok(PollUpdate::Completed(payload_from(wire)));
        }
        if wire.status == STATUS_TRANSCRIPT_ERROR || wire.status == STATUS_FILE_ERROR {
            return Ok(PollUpdate::Failed {
                status: wire.status,
            });
        }
        Ok(PollUpdate::Pending {
            status: wire.status,
        })
    }
}
