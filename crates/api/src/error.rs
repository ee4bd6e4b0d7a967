//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use microloan_shared::AppError;

/// `AppError` rendered as `{"error": CODE, "message": ...}`.
///
/// Infrastructure failures are logged with their cause and answered with a
/// generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_infrastructure() {
            error!(error = %err, code = err.error_code(), "request failed");
        } else if matches!(err, AppError::Conflict(_)) {
            warn!(error = %err, "request abandoned after write conflicts");
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": err.public_message(),
            })),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
