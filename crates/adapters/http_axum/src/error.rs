//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use clothesline_domain::error::{ClotheslineError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ClotheslineError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(ClotheslineError);

impl From<ClotheslineError> for ApiError {
    fn from(err: ClotheslineError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ClotheslineError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ClotheslineError::Unavailable(_) => {
                tracing::warn!(error = %self.0, "service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            ClotheslineError::Store(err) => {
                tracing::error!(error = %err, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
