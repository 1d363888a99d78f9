//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": "...", "status": 400}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use marksheet_db::DbError;
use marksheet_grading::GradingError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found, or there was nothing to compute.
    #[error("{0}")]
    NotFound(String),

    /// The request was well-formed JSON but semantically invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A request body failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The write would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(String),

    /// An internal error occurred. The detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidInput(_) | Self::Validation(_) | Self::InvalidUuid(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<GradingError> for ApiError {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::NotFound { .. } | GradingError::NoData(_) => {
                Self::NotFound(err.to_string())
            }
            GradingError::InvalidInput(msg) => Self::InvalidInput(msg),
            GradingError::ArithmeticOverflow | GradingError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => Self::Conflict(err.to_string()),
            DbError::MissingReference(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
