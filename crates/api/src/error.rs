use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sysguard_core::error::CoreError;
use sysguard_core::metrics::MetricsError;

/// Every handler error. Domain failures arrive as [`CoreError`]; the rest
/// are HTTP concerns.
///
/// Renders as `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A blocking metrics fetch or autofix cycle exceeded its budget.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        AppError::Core(CoreError::Metrics(err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Metrics(err) => {
                    tracing::warn!(error = %err, "Metrics source unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "METRICS_UNAVAILABLE",
                        err.to_string(),
                    )
                }
            },

            AppError::Database(err) => {
                tracing::error!(error = %err, "Alert store error");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Timeout(msg) => {
                tracing::warn!(operation = %msg, "Blocking operation timed out");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", format!("{msg} timed out"))
            }
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

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Timeout("x".into()), StatusCode::GATEWAY_TIMEOUT),
            (
                MetricsError::Unavailable("down".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Core(CoreError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::InternalError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
