//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use stopfire_domain::error::StopfireError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// A use-case failed.
    Domain(StopfireError),
    /// No principal could be established for the request.
    Unauthenticated,
}

impl From<StopfireError> for ApiError {
    fn from(err: StopfireError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated".to_string()),
            Self::Domain(StopfireError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(StopfireError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(StopfireError::Conflict(err)) => (StatusCode::CONFLICT, err.to_string()),
            Self::Domain(StopfireError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
