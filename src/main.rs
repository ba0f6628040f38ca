use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use colloquy::application::ports::{AsrBackend, AsrConfig, GenerativeClient, MediaStore};
use colloquy::application::services::{
    AnalysisConfig, AnalysisFanout, AudioDeliveryResolver, DownloadUpload, NumericSpeakerNamer,
    PipelineService, PollConfig, SegmentBuilder, SegmenterConfig, TranscriptionJobClient,
    UrlDelivery,
};
use colloquy::infrastructure::asr::DagloClient;
use colloquy::infrastructure::llm::GeminiClient;
use colloquy::infrastructure::observability::{init_tracing, TracingConfig};
use colloquy::infrastructure::storage::LocalMediaStore;
use colloquy::presentation::{create_router, AppState, Environment, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    let environment: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            json_format: environment == Environment::Prod,
        },
        settings.server.port,
    );

    let asr_backend: Arc<dyn AsrBackend> = Arc::new(DagloClient::new(
        &settings.asr.base_url,
        &settings.asr.api_key,
    ));

    let generative: Arc<dyn GenerativeClient> = Arc::new(GeminiClient::new(
        settings.analysis.api_key.clone(),
        None,
        Some(settings.analysis.model.clone()),
    ));

    let media_store: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        PathBuf::from(&settings.storage.base_dir),
        &settings.storage.public_base_url,
    )?);

    let resolver = AudioDeliveryResolver::new(vec![
        Box::new(UrlDelivery::new(Arc::clone(&asr_backend))),
        Box::new(DownloadUpload::new(
            Arc::clone(&asr_backend),
            settings.asr.download_timeout,
            settings.asr.max_download_bytes,
        )),
    ]);

    let job_client = TranscriptionJobClient::new(Arc::clone(&asr_backend));

    let segment_builder = SegmentBuilder::new(
        SegmenterConfig {
            min_streak_tokens: settings.segmenter.min_streak_tokens,
        },
        Arc::new(NumericSpeakerNamer),
    );

    let analysis = AnalysisFanout::new(
        Arc::clone(&generative),
        AnalysisConfig {
            max_segments: settings.analysis.max_segments,
            call_timeout: settings.analysis.call_timeout,
        },
    );

    let asr_config = AsrConfig {
        language: settings.asr.language.clone(),
        diarization: true,
        speaker_count_hint: None,
    };

    let poll_config = PollConfig {
        max_attempts: settings.asr.poll_max_attempts,
        interval: settings.asr.poll_interval,
    };

    // Leave headroom past the poll budget so the analysis fanout is not
    // cut off right after a slow transcription.
    let run_timeout = settings.asr.poll_interval * settings.asr.poll_max_attempts
        + settings.analysis.call_timeout
        + Duration::from_secs(30);

    let pipeline = Arc::new(PipelineService::new(
        resolver,
        job_client,
        segment_builder,
        analysis,
        Arc::clone(&media_store),
        asr_config,
        poll_config,
        Some(run_timeout),
    ));

    let state = AppState {
        pipeline,
        media_store,
        settings: settings.clone(),
    };

    let router = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
