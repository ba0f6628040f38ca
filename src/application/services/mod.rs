mod analysis_service;
mod audio_delivery;
mod pipeline_service;
mod segment_builder;
mod transcription_client;

pub use analysis_service::{
    default_interaction, default_overall, default_speaker, parse_model_json, AnalysisConfig,
    AnalysisFanout,
};
pub use audio_delivery::{
    normalize_audio_url, AudioDeliveryResolver, AudioInput, DeliveryError, DeliveryStrategy,
    DownloadUpload, UrlDelivery,
};
pub use pipeline_service::{PipelineError, PipelineErrorKind, PipelineService};
pub use segment_builder::{
    NumericSpeakerNamer, SegmentBuilder, SegmenterConfig, SpeakerNamer, NO_RESULT_TEXT,
};
pub use transcription_client::{PollConfig, TranscriptionClientError, TranscriptionJobClient};
