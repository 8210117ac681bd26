use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::PreviewCall;
use crate::domain::{ExamSet, ExamType, parse_exam_types};
use crate::presentation::auth::AuthenticatedUser;
use crate::presentation::state::AppState;

use super::ErrorResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPreviewRequest {
    pub content: Option<String>,
    pub exam_types: Option<Vec<String>>,
    /// 1-based position of this content within a larger document.
    pub chunk_number: Option<usize>,
    pub total_chunks: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallResponse {
    #[serde(rename = "type")]
    pub exam_type: ExamType,
    pub duration_ms: u64,
    pub question_count: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PreviewCall> for ApiCallResponse {
    fn from(call: PreviewCall) -> Self {
        Self {
            success: call.succeeded(),
            exam_type: call.exam_type,
            duration_ms: call.duration_ms,
            question_count: call.question_count,
            error: call.error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPreviewResponse {
    pub data: ExamSet,
    pub api_calls: Vec<ApiCallResponse>,
}

#[tracing::instrument(skip(state, user, request), fields(owner = %user.email))]
pub async fn exam_preview_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ExamPreviewRequest>,
) -> Response {
    let content = match request.content {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            return ErrorResponse::new(StatusCode::BAD_REQUEST, "Missing required field: content")
                .into_response();
        }
    };

    let exam_types = match request.exam_types.as_deref().map(parse_exam_types) {
        Some(Ok(types)) if !types.is_empty() => types,
        Some(Err(e)) => {
            return ErrorResponse::new(StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        _ => {
            return ErrorResponse::new(StatusCode::BAD_REQUEST, "Missing required field: examTypes")
                .into_response();
        }
    };

    let total_chunks = request.total_chunks.unwrap_or(1).max(1);
    let chunk_index = request
        .chunk_number
        .unwrap_or(1)
        .saturating_sub(1)
        .min(total_chunks - 1);

    let preview = state
        .preview_service
        .preview(&content, &exam_types, chunk_index, total_chunks)
        .await;

    let response = ExamPreviewResponse {
        data: preview.data,
        api_calls: preview.calls.into_iter().map(ApiCallResponse::from).collect(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
