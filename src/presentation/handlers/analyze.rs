use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::services::{AudioInput, PipelineError, PipelineErrorKind};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct AnalyzeUrlRequest {
    pub audio_url: String,
}

/// Accepts a recorded conversation as a multipart upload, stages it in the
/// media store, and runs the full pipeline.
#[tracing::instrument(skip(state, multipart))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Analyze request with no audio file");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No audio file uploaded".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }),
            )
                .into_response();
        }
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read audio bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read audio: {}", e),
                }),
            )
                .into_response();
        }
    };

    if data.len() as u64 > state.settings.server.max_upload_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse {
                error: format!(
                    "Audio exceeds the {} MB upload limit",
                    state.settings.server.max_upload_bytes / (1024 * 1024)
                ),
            }),
        )
            .into_response();
    }

    tracing::debug!(bytes = data.len(), content_type = %content_type, "Audio upload received");

    let staged = match state.media_store.put(data, &content_type).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to stage audio");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to stage audio: {}", e),
                }),
            )
                .into_response();
        }
    };

    let input = AudioInput::Staged {
        path: staged.path,
        url: staged.url,
    };

    run_pipeline(&state, input).await
}

/// Runs the pipeline against a caller-hosted audio URL.
#[tracing::instrument(skip(state, request))]
pub async fn analyze_url_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> impl IntoResponse {
    if request.audio_url.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "A non-empty audio_url is required".to_string(),
            }),
        )
            .into_response();
    }

    run_pipeline(&state, AudioInput::Url(request.audio_url)).await
}

async fn run_pipeline(state: &AppState, input: AudioInput) -> axum::response::Response {
    match state.pipeline.run(input).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Pipeline run failed");
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error.kind() {
        PipelineErrorKind::Delivery
        | PipelineErrorKind::Submission
        | PipelineErrorKind::Transcription => StatusCode::BAD_GATEWAY,
        PipelineErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}
