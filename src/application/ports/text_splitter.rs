use async_trait::async_trait;

#[async_trait]
pub trait TextSplitter: Send + Sync {
    /// Splits source text into ordered chunks. Never returns an empty list on success.
    async fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),
    #[error("splitting failed: {0}")]
    SplittingFailed(String),
}
