//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use autoapply_domain::error::{AutoApplyError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AutoApplyError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(AutoApplyError);

impl ApiError {
    /// A path or query identifier that is not a valid UUID.
    pub(crate) fn invalid_id(raw: &str) -> Self {
        Self(ValidationError::InvalidId(raw.to_string()).into())
    }
}

impl From<AutoApplyError> for ApiError {
    fn from(err: AutoApplyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AutoApplyError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AutoApplyError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AutoApplyError::Transition(err) => (StatusCode::CONFLICT, err.to_string()),
            AutoApplyError::Storage(err) => {
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
