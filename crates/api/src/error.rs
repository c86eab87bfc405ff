use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use execd_core::artifact::ArtifactError;
use execd_core::exec::ExecError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the core error taxonomies and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from the artifact retrieval flow.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// A failure to spawn or supervise a command.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- ArtifactError variants ---
            AppError::Artifact(artifact) => match artifact {
                ArtifactError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                ArtifactError::NotFound => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "artifact not found".to_string(),
                ),
                // Diagnostic detail (exit status, timeout flag, stderr)
                // is surfaced verbatim; stdout never is.
                ArtifactError::Retrieval { .. } => {
                    tracing::error!(error = %artifact, "Artifact download failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RETRIEVAL_ERROR",
                        artifact.to_string(),
                    )
                }
                ArtifactError::Integrity => {
                    tracing::error!("Artifact tool reported success without output");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTEGRITY_ERROR",
                        "artifact output not created".to_string(),
                    )
                }
                ArtifactError::Exec(err) => {
                    tracing::error!(error = %err, "Artifact tool could not be run");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                ArtifactError::Io(err) => {
                    tracing::error!(error = %err, "Artifact I/O error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Executor errors ---
            AppError::Exec(err) => {
                tracing::error!(error = %err, "Command execution error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
