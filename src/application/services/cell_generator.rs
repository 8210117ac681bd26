use std::sync::Arc;

use crate::application::ports::{GenerationClient, GenerationClientError};
use crate::domain::{ExamType, QuestionRecord};

use super::{MalformedGenerationOutput, PromptBuilder, parse_generation_output};

/// Runs one (chunk, exam type) cell: build prompt, call provider, parse.
pub struct CellGenerator {
    generation_client: Arc<dyn GenerationClient>,
    prompt_builder: PromptBuilder,
}

impl CellGenerator {
    pub fn new(generation_client: Arc<dyn GenerationClient>, prompt_builder: PromptBuilder) -> Self {
        Self {
            generation_client,
            prompt_builder,
        }
    }

    pub async fn generate(
        &self,
        chunk: &str,
        exam_type: ExamType,
        chunk_index: usize,
        total_chunks: usize,
    ) -> Result<Vec<QuestionRecord>, CellError> {
        let request = self
            .prompt_builder
            .build(chunk, exam_type, chunk_index, total_chunks);

        tracing::debug!(
            exam_type = %exam_type,
            chunk = chunk_index + 1,
            prompt_chars = request.user_prompt.chars().count(),
            "Requesting generation"
        );

        let raw = self.generation_client.generate(&request).await?;
        let records = parse_generation_output(&raw, exam_type)?;
        Ok(records)
    }
}

/// Failure confined to a single cell. Never fails the job.
#[derive(Debug, thiserror::Error)]
pub enum CellError {
    #[error("provider: {0}")]
    Provider(#[from] GenerationClientError),
    #[error(transparent)]
    Malformed(#[from] MalformedGenerationOutput),
}
