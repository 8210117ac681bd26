use std::sync::Arc;

use crate::application::ports::{
    GenerationClient, JobStateStore, RepositoryError, TextSplitter, TextSplitterError,
};
use crate::domain::{ExamType, FileId};

use super::{CellGenerator, PromptBuilder};

/// Work item handed from the start request to the background worker.
#[derive(Debug, Clone)]
pub struct GenerationMessage {
    pub file_id: FileId,
    pub content: String,
    pub exam_types: Vec<ExamType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub total_chunks: usize,
    pub questions_appended: usize,
    pub failed_cells: usize,
}

/// Drives the chunk x exam-type matrix for one file.
///
/// Cells run in order: every exam type of chunk `i` is attempted before
/// `chunksProcessed` moves to `i + 1`. A failing cell is logged and skipped;
/// only splitting or state-store failures end the job as failed.
pub struct ExamGenerationPipeline {
    cells: CellGenerator,
    job_state_store: Arc<dyn JobStateStore>,
    text_splitter: Arc<dyn TextSplitter>,
}

impl ExamGenerationPipeline {
    pub fn new(
        generation_client: Arc<dyn GenerationClient>,
        job_state_store: Arc<dyn JobStateStore>,
        text_splitter: Arc<dyn TextSplitter>,
    ) -> Self {
        Self::with_prompt_builder(
            generation_client,
            job_state_store,
            text_splitter,
            PromptBuilder::default(),
        )
    }

    pub fn with_prompt_builder(
        generation_client: Arc<dyn GenerationClient>,
        job_state_store: Arc<dyn JobStateStore>,
        text_splitter: Arc<dyn TextSplitter>,
        prompt_builder: PromptBuilder,
    ) -> Self {
        Self {
            cells: CellGenerator::new(generation_client, prompt_builder),
            job_state_store,
            text_splitter,
        }
    }

    /// Runs a job whose state was already initialised by the start request.
    /// Any fatal error is written to the job record before it is returned.
    pub async fn run(
        &self,
        msg: &GenerationMessage,
    ) -> Result<GenerationSummary, JobInfrastructureError> {
        let result = self.process(msg).await;

        match &result {
            Ok(summary) => {
                tracing::info!(
                    total_chunks = summary.total_chunks,
                    questions = summary.questions_appended,
                    failed_cells = summary.failed_cells,
                    "Exam generation completed"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Exam generation failed");
                if let Err(mark_err) = self
                    .job_state_store
                    .fail_generation(msg.file_id, &e.to_string())
                    .await
                {
                    tracing::error!(
                        error = %mark_err,
                        "Could not record generation failure"
                    );
                }
            }
        }

        result
    }

    async fn process(
        &self,
        msg: &GenerationMessage,
    ) -> Result<GenerationSummary, JobInfrastructureError> {
        let file_id = msg.file_id;

        let chunks = self
            .text_splitter
            .split(&msg.content)
            .await
            .map_err(JobInfrastructureError::Splitting)?;
        let total_chunks = chunks.len();

        self.job_state_store
            .set_total_chunks(file_id, total_chunks)
            .await?;
        tracing::debug!(total_chunks, "Content chunked");

        let mut summary = GenerationSummary {
            total_chunks,
            ..Default::default()
        };

        for (index, chunk) in chunks.iter().enumerate() {
            for &exam_type in &msg.exam_types {
                match self
                    .cells
                    .generate(chunk, exam_type, index, total_chunks)
                    .await
                {
                    Ok(records) if records.is_empty() => {
                        tracing::info!(
                            exam_type = %exam_type,
                            chunk = index + 1,
                            "No questions generated"
                        );
                    }
                    Ok(records) => {
                        self.job_state_store
                            .append_questions(file_id, exam_type, &records)
                            .await?;
                        summary.questions_appended += records.len();
                        tracing::info!(
                            exam_type = %exam_type,
                            chunk = index + 1,
                            questions = records.len(),
                            "Saved generated questions"
                        );
                    }
                    Err(e) => {
                        summary.failed_cells += 1;
                        tracing::warn!(
                            exam_type = %exam_type,
                            chunk = index + 1,
                            error = %e,
                            "Generation cell failed, continuing"
                        );
                    }
                }
            }

            self.job_state_store
                .set_chunks_processed(file_id, index + 1)
                .await?;
        }

        self.job_state_store.complete_generation(file_id).await?;

        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobInfrastructureError {
    #[error("chunking failed: {0}")]
    Splitting(TextSplitterError),
    #[error("job state store: {0}")]
    Repository(#[from] RepositoryError),
}
