use async_trait::async_trait;

use crate::domain::{ExamType, FileId, QuestionRecord, SourceFile};

use super::RepositoryError;

/// Document store holding each file's generation progress and question arrays.
///
/// Progress writes (`set_total_chunks`, `set_chunks_processed`) and the
/// terminal transitions only touch a job that is still processing.
#[async_trait]
pub trait JobStateStore: Send + Sync {
    async fn find_file(
        &self,
        id: FileId,
        owner_email: &str,
    ) -> Result<Option<SourceFile>, RepositoryError>;

    /// Resets the job to processing with zeroed counters. Existing question
    /// arrays are kept; missing ones are created empty.
    async fn begin_generation(&self, id: FileId) -> Result<(), RepositoryError>;

    async fn set_total_chunks(&self, id: FileId, total_chunks: usize)
    -> Result<(), RepositoryError>;

    /// Appends to the array of `exam_type` and touches `updatedAt`.
    async fn append_questions(
        &self,
        id: FileId,
        exam_type: ExamType,
        records: &[QuestionRecord],
    ) -> Result<(), RepositoryError>;

    async fn set_chunks_processed(
        &self,
        id: FileId,
        chunks_processed: usize,
    ) -> Result<(), RepositoryError>;

    async fn complete_generation(&self, id: FileId) -> Result<(), RepositoryError>;

    async fn fail_generation(&self, id: FileId, error_message: &str)
    -> Result<(), RepositoryError>;
}
