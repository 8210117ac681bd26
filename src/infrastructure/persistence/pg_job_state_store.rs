use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobStateStore, RepositoryError};
use crate::domain::{ExamSet, ExamType, FileId, GenerationJob, QuestionRecord, SourceFile};

// Both spellings of the running state, so rows written before the status
// rename keep accepting progress.
const ACTIVE_STATUS_FILTER: &str = "exam_generation->>'status' IN ('processing', 'generating')";

/// PostgreSQL adapter. Each file row carries the generation record and the
/// question arrays as JSONB documents.
pub struct PgJobStateStore {
    pool: PgPool,
}

impl PgJobStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, file), fields(file_id = %file.id))]
    pub async fn insert_file(&self, file: &SourceFile) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO files (id, title, content, owner_email, created_at, updated_at, exam_generation, exams)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(file.id.as_uuid())
        .bind(&file.title)
        .bind(&file.content)
        .bind(&file.owner_email)
        .bind(file.created_at)
        .bind(file.updated_at)
        .bind(file.exam_generation.as_ref().map(Json))
        .bind(Json(&file.exams))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    async fn update_active_job(
        &self,
        id: FileId,
        assignment: &str,
        bind: impl FnOnce(
            sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        ) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<(), RepositoryError> {
        let sql = format!(
            "UPDATE files SET exam_generation = {} WHERE id = $1 AND {}",
            assignment, ACTIVE_STATUS_FILTER
        );
        let result = bind(sqlx::query(&sql).bind(id.as_uuid()))
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "active generation job for file {}",
                id
            )));
        }
        Ok(())
    }
}

fn row_to_source_file(row: &sqlx::postgres::PgRow) -> Result<SourceFile, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let id: Uuid = row.try_get("id").map_err(get_err)?;
    let exam_generation: Option<serde_json::Value> =
        row.try_get("exam_generation").map_err(get_err)?;
    let exams: serde_json::Value = row.try_get("exams").map_err(get_err)?;

    let exam_generation = exam_generation
        .map(serde_json::from_value::<GenerationJob>)
        .transpose()
        .map_err(|e| RepositoryError::CorruptDocument(format!("exam_generation: {}", e)))?;
    let exams: ExamSet = serde_json::from_value(exams)
        .map_err(|e| RepositoryError::CorruptDocument(format!("exams: {}", e)))?;

    Ok(SourceFile {
        id: FileId::from_uuid(id),
        title: row.try_get("title").map_err(get_err)?,
        content: row.try_get("content").map_err(get_err)?,
        owner_email: row.try_get("owner_email").map_err(get_err)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(get_err)?,
        updated_at: row
            .try_get::<Option<DateTime<Utc>>, _>("updated_at")
            .map_err(get_err)?,
        exam_generation,
        exams,
    })
}

#[async_trait]
impl JobStateStore for PgJobStateStore {
    #[instrument(skip(self, owner_email), fields(file_id = %id))]
    async fn find_file(
        &self,
        id: FileId,
        owner_email: &str,
    ) -> Result<Option<SourceFile>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, owner_email, created_at, updated_at, exam_generation, exams
            FROM files
            WHERE id = $1 AND owner_email = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_source_file).transpose()
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn begin_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        let job = GenerationJob::started(Utc::now());

        let result = sqlx::query(
            r#"
            UPDATE files
            SET exam_generation = $2,
                exams = jsonb_build_object(
                    'mcqs', COALESCE(exams->'mcqs', '[]'::jsonb),
                    'fillBlanks', COALESCE(exams->'fillBlanks', '[]'::jsonb),
                    'solutions', COALESCE(exams->'solutions', '[]'::jsonb)
                )
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(&job))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("file {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn set_total_chunks(
        &self,
        id: FileId,
        total_chunks: usize,
    ) -> Result<(), RepositoryError> {
        self.update_active_job(
            id,
            "jsonb_set(exam_generation, '{totalChunks}', to_jsonb($2::bigint))",
            |q| q.bind(total_chunks as i64),
        )
        .await
    }

    #[instrument(skip(self, records), fields(file_id = %id, exam_type = %exam_type, count = records.len()))]
    async fn append_questions(
        &self,
        id: FileId,
        exam_type: ExamType,
        records: &[QuestionRecord],
    ) -> Result<(), RepositoryError> {
        let matching: Vec<&QuestionRecord> = records
            .iter()
            .filter(|r| r.exam_type() == exam_type)
            .collect();
        if matching.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE files
            SET exams = jsonb_set(
                    exams,
                    ARRAY[$2::text],
                    COALESCE(exams->($2::text), '[]'::jsonb) || $3::jsonb,
                    true
                ),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(exam_type.array_key())
        .bind(Json(&matching))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("file {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn set_chunks_processed(
        &self,
        id: FileId,
        chunks_processed: usize,
    ) -> Result<(), RepositoryError> {
        self.update_active_job(
            id,
            r#"jsonb_set(
                exam_generation,
                '{chunksProcessed}',
                to_jsonb(GREATEST(
                    COALESCE((exam_generation->>'chunksProcessed')::bigint, 0),
                    LEAST($2::bigint, COALESCE((exam_generation->>'totalChunks')::bigint, 0))
                ))
            )"#,
            |q| q.bind(chunks_processed as i64),
        )
        .await
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn complete_generation(&self, id: FileId) -> Result<(), RepositoryError> {
        self.update_active_job(
            id,
            "exam_generation || jsonb_build_object('status', 'completed', 'completedAt', $2::jsonb)",
            |q| q.bind(Json(Utc::now())),
        )
        .await
    }

    #[instrument(skip(self, error_message), fields(file_id = %id))]
    async fn fail_generation(
        &self,
        id: FileId,
        error_message: &str,
    ) -> Result<(), RepositoryError> {
        let error_message = error_message.to_string();
        self.update_active_job(
            id,
            "exam_generation || jsonb_build_object('status', 'failed', 'error', $2::text, 'completedAt', $3::jsonb)",
            move |q| q.bind(error_message).bind(Json(Utc::now())),
        )
        .await
    }
}
