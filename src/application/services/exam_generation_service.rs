use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{JobStateStore, RepositoryError};
use crate::domain::{ExamType, FileId};

use super::GenerationMessage;

/// Caller-facing start operation. Initialises the job record and hands the
/// work to the background worker, returning without waiting for it.
pub struct ExamGenerationService {
    job_state_store: Arc<dyn JobStateStore>,
    sender: mpsc::Sender<GenerationMessage>,
}

impl ExamGenerationService {
    pub fn new(job_state_store: Arc<dyn JobStateStore>, sender: mpsc::Sender<GenerationMessage>) -> Self {
        Self {
            job_state_store,
            sender,
        }
    }

    pub async fn start(
        &self,
        owner_email: &str,
        file_id: FileId,
        exam_types: Vec<ExamType>,
    ) -> Result<(), StartGenerationError> {
        if exam_types.is_empty() {
            return Err(StartGenerationError::NoExamTypes);
        }

        let file = self
            .job_state_store
            .find_file(file_id, owner_email)
            .await?
            .ok_or(StartGenerationError::FileNotFound(file_id))?;

        if !file.has_content() {
            return Err(StartGenerationError::EmptyContent(file_id));
        }

        // Claim the queue slot before any state is written, so a busy or
        // stopped worker never leaves a job at processing with nothing queued.
        let permit = self.sender.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => {
                tracing::warn!(file_id = %file_id, "Generation queue full, rejecting start");
                StartGenerationError::QueueFull
            }
            TrySendError::Closed(()) => {
                tracing::error!(file_id = %file_id, "Generation worker unavailable");
                StartGenerationError::QueueClosed
            }
        })?;

        self.job_state_store.begin_generation(file_id).await?;

        permit.send(GenerationMessage {
            file_id,
            content: file.content,
            exam_types,
        });

        tracing::info!(file_id = %file_id, "Exam generation job enqueued");
        Ok(())
    }

    /// False once the worker has stopped consuming jobs.
    pub fn is_accepting(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartGenerationError {
    #[error("no exam types requested")]
    NoExamTypes,
    #[error("file not found: {0}")]
    FileNotFound(FileId),
    #[error("file has no content: {0}")]
    EmptyContent(FileId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("generation queue is full, try again later")]
    QueueFull,
    #[error("generation worker unavailable")]
    QueueClosed,
}
