use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use uuid::Uuid;

use crate::application::ports::{MediaStore, MediaStoreError, StoredMedia};

/// Filesystem-backed media store. Objects land under `uploads/` in the
/// configured base directory and are served from a public base URL by
/// whatever fronts that directory.
pub struct LocalMediaStore {
    inner: Arc<LocalFileSystem>,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(base_path: PathBuf, public_base_url: &str) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_path).map_err(MediaStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, data: Bytes, content_type: &str) -> Result<StoredMedia, MediaStoreError> {
        let path = format!(
            "uploads/audio_{}.{}",
            Uuid::new_v4(),
            extension_for(content_type)
        );
        let store_path = StorePath::from(path.as_str());

        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        let url = self.public_url(&path);
        tracing::debug!(path = %path, "Staged audio upload");

        Ok(StoredMedia { path, url })
    }

    async fn delete(&self, path: &str) -> Result<(), MediaStoreError> {
        let store_path = StorePath::from(path);
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| MediaStoreError::DeleteFailed(e.to_string()))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}
