use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ExamSet, FileId, GenerationStatus};
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusResponse {
    pub file_id: FileId,
    pub status: GenerationStatus,
    pub chunks_processed: usize,
    pub total_chunks: usize,
    pub progress_percent: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub exams: ExamSet,
}

#[tracing::instrument(skip(state, user), fields(owner = %user.email))]
pub async fn generation_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(file_id): Path<String>,
) -> Response {
    let file_id: FileId = match file_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid file ID: {}", file_id),
            )
            .into_response();
        }
    };

    match state.job_state_store.find_file(file_id, &user.email).await {
        Ok(Some(file)) => {
            let job = file.generation();
            let response = GenerationStatusResponse {
                file_id: file.id,
                status: job.status,
                chunks_processed: job.chunks_processed,
                total_chunks: job.total_chunks,
                progress_percent: job.progress_percent(),
                started_at: job.started_at,
                completed_at: job.completed_at,
                error: job.error,
                updated_at: file.updated_at,
                exams: file.exams,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => ErrorResponse::new(
            StatusCode::NOT_FOUND,
            format!("File not found: {}", file_id),
        )
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch generation status");
            ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch generation status",
            )
            .into_response()
        }
    }
}
