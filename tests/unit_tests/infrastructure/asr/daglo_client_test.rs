use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use colloquy::application::ports::{
    AsrBackend, AsrBackendError, AsrConfig, PollUpdate, Submission,
};
use colloquy::infrastructure::asr::DagloClient;

async fn start_mock_server(app: Router) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn submit_route(response_status: u16, response_body: &'static str) -> Router {
    Router::new().route(
        "/stt/v1/async/transcripts",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    )
}

fn poll_route(response_body: &'static str) -> Router {
    Router::new().route(
        "/stt/v1/async/transcripts/{rid}",
        get(move || async move {
            ([("content-type", "application/json")], response_body).into_response()
        }),
    )
}

#[tokio::test]
async fn given_accepted_submission_when_submitting_url_then_rid_returned() {
    let (base_url, shutdown_tx) = start_mock_server(submit_route(200, r#"{"rid":"abc123"}"#)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let submission = client
        .submit_url("https://store/a.wav?alt=media", &AsrConfig::default())
        .await
        .unwrap();

    assert!(matches!(submission, Submission::Job(rid) if rid == "abc123"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_response_without_rid_when_submitting_then_missing_job_id() {
    let (base_url, shutdown_tx) = start_mock_server(submit_route(200, r#"{}"#)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let result = client
        .submit_url("https://store/a.wav?alt=media", &AsrConfig::default())
        .await;

    assert!(matches!(result, Err(AsrBackendError::MissingJobId)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_error_status_when_submitting_then_submission_rejected() {
    let (base_url, shutdown_tx) =
        start_mock_server(submit_route(403, r#"{"message":"invalid url"}"#)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let result = client
        .submit_url("https://store/a.wav?alt=media", &AsrConfig::default())
        .await;

    assert!(matches!(result, Err(AsrBackendError::Rejected(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_failure_field_in_body_when_submitting_then_submission_rejected() {
    let (base_url, shutdown_tx) = start_mock_server(submit_route(
        200,
        r#"{"result":"FAILED","message":"unsupported codec"}"#,
    ))
    .await;

    let client = DagloClient::new(&base_url, "test-key");
    let result = client
        .submit_url("https://store/a.wav?alt=media", &AsrConfig::default())
        .await;

    match result {
        Err(AsrBackendError::Rejected(message)) => assert_eq!(message, "unsupported codec"),
        other => panic!("expected rejection, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_multipart_upload_when_submitting_file_then_rid_returned() {
    let app = Router::new().route(
        "/stt/v1/async/transcripts/file",
        post(|| async { r#"{"rid":"upload-1"}"# }),
    );
    let (base_url, shutdown_tx) = start_mock_server(app).await;

    let client = DagloClient::new(&base_url, "test-key");
    let submission = client
        .submit_file(
            Bytes::from_static(b"fake audio"),
            "meeting.wav",
            &AsrConfig::default(),
        )
        .await
        .unwrap();

    assert!(matches!(submission, Submission::Job(rid) if rid == "upload-1"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_transcribed_job_when_polling_then_words_become_tokens() {
    let body = r#"{
        "status": "transcribed",
        "sttResults": [{
            "transcript": "안녕하세요 반갑습니다",
            "words": [
                {"word": "안녕", "speaker": "1", "startTime": {"seconds": "0", "nanos": 0}, "endTime": {"seconds": "1", "nanos": 500000000}},
                {"word": "하세요", "speaker": "1", "startTime": {"seconds": "1", "nanos": 500000000}, "endTime": {"seconds": 2, "nanos": 0}},
                {"word": "반갑습니다", "speaker": "2", "startTime": {"seconds": 2, "nanos": 0}, "endTime": {"seconds": "3", "nanos": 250000000}}
            ]
        }]
    }"#;
    let (base_url, shutdown_tx) = start_mock_server(poll_route(body)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let update = client.poll("abc123").await.unwrap();

    match update {
        PollUpdate::Completed(payload) => {
            assert_eq!(
                payload.full_transcript.as_deref(),
                Some("안녕하세요 반갑습니다")
            );
            assert_eq!(payload.tokens.len(), 3);
            assert_eq!(payload.tokens[0].text, "안녕");
            assert_eq!(payload.tokens[0].speaker_id, "1");
            assert_eq!(payload.tokens[0].start_time, 0.0);
            assert_eq!(payload.tokens[0].end_time, 1.5);
            assert_eq!(payload.tokens[2].speaker_id, "2");
            assert_eq!(payload.tokens[2].end_time, 3.25);
        }
        other => panic!("expected completed job, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_word_without_speaker_when_polling_then_default_speaker_assigned() {
    let body = r#"{
        "status": "transcribed",
        "sttResults": [{
            "words": [
                {"word": "hello", "startTime": {"seconds": 0, "nanos": 0}, "endTime": {"seconds": 1, "nanos": 0}}
            ]
        }]
    }"#;
    let (base_url, shutdown_tx) = start_mock_server(poll_route(body)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let update = client.poll("abc123").await.unwrap();

    match update {
        PollUpdate::Completed(payload) => {
            assert_eq!(payload.tokens[0].speaker_id, "1");
        }
        other => panic!("expected completed job, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_processing_job_when_polling_then_pending_with_raw_status() {
    let (base_url, shutdown_tx) =
        start_mock_server(poll_route(r#"{"status":"processing"}"#)).await;

    let client = DagloClient::new(&base_url, "test-key");
    let update = client.poll("abc123").await.unwrap();

    match update {
        PollUpdate::Pending { status } => assert_eq!(status, "processing"),
        other => panic!("expected pending job, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_terminal_error_statuses_when_polling_then_failed_with_status() {
    for terminal in ["transcript_error", "file_error"] {
        let body: &'static str = match terminal {
            "transcript_error" => r#"{"status":"transcript_error"}"#,
            _ => r#"{"status":"file_error"}"#,
        };
        let (base_url, shutdown_tx) = start_mock_server(poll_route(body)).await;

        let client = DagloClient::new(&base_url, "test-key");
        let update = client.poll("abc123").await.unwrap();

        match update {
            PollUpdate::Failed { status } => assert_eq!(status, terminal),
            other => panic!("expected failed job, got {:?}", other),
        }
        shutdown_tx.send(()).ok();
    }
}
