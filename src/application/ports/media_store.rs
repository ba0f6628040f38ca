use async_trait::async_trait;
use bytes::Bytes;

/// Location of a staged object plus the URL an external service can fetch
/// it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub path: String,
    pub url: String,
}

/// Temporary storage for uploaded audio. The pipeline stages bytes here so
/// the ASR backend can fetch them; deletion is best-effort and owned by the
/// pipeline coordinator.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, data: Bytes, content_type: &str) -> Result<StoredMedia, MediaStoreError>;

    async fn delete(&self, path: &str) -> Result<(), MediaStoreError>;

    fn public_url(&self, path: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
