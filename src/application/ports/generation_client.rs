use async_trait::async_trait;

use crate::domain::GenerationRequest;

/// Text-generation provider. Returns the raw completion text, which callers
/// must treat as untrusted and possibly not JSON at all.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
