use async_trait::async_trait;

/// Generative text backend. Responses are free-form; callers must not
/// assume well-formed JSON.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
