mod asr_backend;
mod generative_client;
mod media_store;

pub use asr_backend::{
    AsrBackend, AsrBackendError, AsrConfig, PollUpdate, Submission, TranscriptionPayload,
};
pub use generative_client::{GenerativeClient, GenerativeError};
pub use media_store::{MediaStore, MediaStoreError, StoredMedia};
