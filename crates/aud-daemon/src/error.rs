//! Maps `aud_service::AuditError` onto HTTP status. Kept in `aud-daemon`
//! rather than `aud-service` so the service layer stays framework-agnostic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use aud_service::AuditError;

pub struct ApiError(pub AuditError);

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            AuditError::NotFound(d) => (StatusCode::NOT_FOUND, d.clone()),
            AuditError::StateConflict(d) => (StatusCode::CONFLICT, d.clone()),
            AuditError::Validation(d) => (StatusCode::UNPROCESSABLE_ENTITY, d.clone()),
            AuditError::Forbidden(d) => (StatusCode::FORBIDDEN, d.clone()),
            AuditError::Unauthorised(d) => (StatusCode::UNAUTHORIZED, d.clone()),
            AuditError::UpstreamUnavailable(d) => (StatusCode::SERVICE_UNAVAILABLE, d.clone()),
            AuditError::UpstreamError(d) => (StatusCode::BAD_GATEWAY, d.clone()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
