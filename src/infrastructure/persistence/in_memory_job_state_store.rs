use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{JobStateStore, RepositoryError};
use crate::domain::{ExamType, FileId, GenerationJob, QuestionRecord, SourceFile};

/// Process-local document store. Backs scaffold mode and tests.
#[derive(Default)]
pub struct InMemoryJobStateStore {
    files: RwLock<HashMap<FileId, SourceFile>>,
}

impl InMemoryJobStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, file: SourceFile) {
        self.files.write().await.insert(file.id, file);
    }

    pub async fn get(&self, id: FileId) -> Option<SourceFile> {
        self.files.read().await.get(&id).cloned()
    }

    async fn with_file<T>(
        &self,
        id: FileId,
        update: impl FnOnce(&mut SourceFile) -> T,
    ) -> Result<T, RepositoryError> {
        let mut files = self.files.write().await;
        let file = files
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("file {}", id)))?;
        Ok(update(file))
    }

    async fn with_job(
        &self,
        id: FileId,
        update: impl FnOnce(&mut GenerationJob),
    ) -> Result<(), RepositoryError> {
        let updated = self
            .with_file(id, |file| match file.exam_generation.as_mut() {
                Some(job) if job.is_active() => {
                    update(job);
                    true
                }
                _ => false,
            })
            .await?;

        if !updated {
            return Err(RepositoryError::NotFound(format!(
                "active generation job for file {}",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStateStore for InMemoryJobStateStore {
    async fn find_file(
        &self,
        id: FileId,
        owner_email: &str,
    ) -> Result<Option<SourceFile>, RepositoryError> {
        Ok(self
            .files
            .read()
            .await
            .get(&id)
            .filter(|f| f.owner_email == owner_email)
            .cloned())
    }

    async fn begin_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        self.with_file(id, |file| {
            file.exam_generation = Some(GenerationJob::started(Utc::now()));
        })
        .await
    }

    async fn set_total_chunks(
        &self,
        id: FileId,
        total_chunks: usize,
    ) -> Result<(), RepositoryError> {
        self.with_job(id, |job| job.record_total_chunks(total_chunks))
            .await
    }

    async fn append_questions(
        &self,
        id: FileId,
        exam_type: ExamType,
        records: &[QuestionRecord],
    ) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        self.with_file(id, |file| {
            file.exams.append(
                records
                    .iter()
                    .filter(|r| r.exam_type() == exam_type)
                    .cloned(),
            );
            file.updated_at = Some(Utc::now());
        })
        .await
    }

    async fn set_chunks_processed(
        &self,
        id: FileId,
        chunks_processed: usize,
    ) -> Result<(), RepositoryError> {
        self.with_job(id, |job| job.record_chunks_processed(chunks_processed))
            .await
    }

    async fn complete_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        self.with_job(id, |job| job.complete(Utc::now())).await
    }

    async fn fail_generation(
        &self,
        id: FileId,
        error_message: &str,
    ) -> Result<(), RepositoryError> {
        self.with_job(id, |job| job.fail(error_message, Utc::now()))
            .await
    }
}
