use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use syncup_core::error::CoreError;
use syncup_store::{StorageError, StoreError};
use syncup_upstream::{CalendarError, UpstreamError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, store and upstream failures, and
/// adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent `{error, code}` JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `syncup_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store mutation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An upstream service call failed. Relayed with the upstream status.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed caller credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::Invalid(core) => AppError::Core(core),
            CalendarError::Upstream(upstream) => AppError::Upstream(upstream),
        }
    }
}

fn internal() -> (StatusCode, &'static str, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        json!("An internal error occurred"),
    )
}

fn classify_core(core: &CoreError) -> (StatusCode, &'static str, Value) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            json!(format!("{entity} with id {id} not found")),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", json!(msg)),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core(core),

            AppError::Store(StoreError::Core(core)) => classify_core(core),
            AppError::Store(StoreError::Storage(err)) => {
                match err {
                    StorageError::Io(e) => tracing::error!(error = %e, "Snapshot write failed"),
                    StorageError::Serialize(e) => {
                        tracing::error!(error = %e, "Snapshot serialization failed")
                    }
                }
                internal()
            }

            AppError::Upstream(err @ UpstreamError::InvalidPath(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", json!(err.to_string()))
            }

            // Upstream status and body are passed through as they are.
            AppError::Upstream(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                tracing::warn!(status = status.as_u16(), error = %err, "Upstream request failed");
                (status, "UPSTREAM_ERROR", err.body())
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", json!(msg)),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", json!(msg)),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
