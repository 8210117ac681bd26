use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub generation_worker: &'static str,
}

/// Liveness plus the one dependency the process owns: a stopped generation
/// worker means new jobs can never run, so the service reports degraded.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let accepting = state.generation_service.is_accepting();
    let (status, body) = if accepting {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: body,
            version: env!("CARGO_PKG_VERSION"),
            generation_worker: if accepting { "running" } else { "stopped" },
        }),
    )
}
