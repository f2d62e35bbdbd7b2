use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pad_core::error::CoreError;
use pad_core::transform::{error_summary, Envelope};
use serde_json::Value;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] so every failure is rendered as a failed
/// envelope (`success: false`, empty `data`).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `pad_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope): (StatusCode, Envelope<Vec<Value>>) = match &self {
            AppError::Core(core) => {
                let status = match core {
                    CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::ReferenceNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    CoreError::UpstreamUnavailable(msg) => {
                        tracing::warn!(error = %msg, "PAD service request failed");
                        StatusCode::BAD_GATEWAY
                    }
                    CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal core error");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let envelope = match core {
                    CoreError::Internal(_) => {
                        Envelope::failure("An internal error occurred", error_summary(core))
                    }
                    _ => Envelope::from_error(core),
                };
                (status, envelope)
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Envelope::failure(msg.clone(), "The request was rejected as invalid."),
            ),
        };

        (status, axum::Json(envelope)).into_response()
    }
}
