use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::StartGenerationError;
use crate::domain::{FileId, parse_exam_types};
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationRequest {
    pub file_id: Option<String>,
    pub exam_types: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGenerationResponse {
    pub success: bool,
    pub message: String,
    pub file_id: FileId,
}

#[tracing::instrument(skip(state, user, request), fields(owner = %user.email))]
pub async fn start_generation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<StartGenerationRequest>,
) -> Response {
    let (Some(raw_file_id), Some(raw_exam_types)) = (request.file_id, request.exam_types) else {
        return ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "Missing required fields: fileId, examTypes",
        )
        .into_response();
    };

    let file_id: FileId = match raw_file_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid file ID: {}", raw_file_id),
            )
            .into_response();
        }
    };

    let exam_types = match parse_exam_types(&raw_exam_types) {
        Ok(types) => types,
        Err(e) => return ErrorResponse::new(StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match state
        .generation_service
        .start(&user.email, file_id, exam_types)
        .await
    {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(StartGenerationResponse {
                success: true,
                message: "Exam generation started".to_string(),
                file_id,
            }),
        )
            .into_response(),
        Err(e) => start_error_response(e).into_response(),
    }
}

fn start_error_response(error: StartGenerationError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        StartGenerationError::NoExamTypes | StartGenerationError::EmptyContent(_) => {
            StatusCode::BAD_REQUEST
        }
        StartGenerationError::FileNotFound(_) => StatusCode::NOT_FOUND,
        StartGenerationError::QueueFull | StartGenerationError::QueueClosed => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        StartGenerationError::Repository(e) => {
            tracing::error!(error = %e, "Failed to start exam generation");
            return ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start exam generation",
            );
        }
    };
    ErrorResponse::new(status, error.to_string())
}
