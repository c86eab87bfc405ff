//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct
//! HTTP status code, error code, and message. They do NOT need an HTTP
//! server -- they call `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use execd_api::error::AppError;
use execd_core::artifact::ArtifactError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON
/// body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: ArtifactError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Artifact(ArtifactError::Validation("invalid artifact_id".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "invalid artifact_id");
}

// ---------------------------------------------------------------------------
// Test: ArtifactError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Artifact(ArtifactError::NotFound);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "artifact not found");
}

// ---------------------------------------------------------------------------
// Test: ArtifactError::Retrieval maps to 500 and carries diagnostics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retrieval_error_returns_500_with_diagnostics() {
    let err = AppError::Artifact(ArtifactError::Retrieval {
        exit_code: 124,
        timed_out: true,
        stderr: "download stalled".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "RETRIEVAL_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("exit code 124"));
    assert!(message.contains("timed out true"));
    assert!(message.contains("download stalled"));
}

// ---------------------------------------------------------------------------
// Test: ArtifactError::Integrity maps to 500 with INTEGRITY_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn integrity_error_returns_500() {
    let err = AppError::Artifact(ArtifactError::Integrity);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTEGRITY_ERROR");
    assert_eq!(json["error"], "artifact output not created");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("script is required".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "script is required");
}

// ---------------------------------------------------------------------------
// Test: internal errors never leak their message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_sanitized_500() {
    let err = AppError::InternalError("scratch dir on fire".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
