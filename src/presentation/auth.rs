use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use super::handlers::ErrorResponse;

/// Header through which the upstream auth layer passes the signed-in user.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The caller identity established by the session layer in front of this service.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| AuthenticatedUser {
                email: email.to_string(),
            })
            .ok_or_else(|| {
                tracing::warn!("Request without authenticated user");
                ErrorResponse::new(StatusCode::UNAUTHORIZED, "Unauthorized")
            })
    }
}
