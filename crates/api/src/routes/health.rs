use std::collections::HashMap;
use std::time::Duration;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use execd_core::exec::{self, ExecRequest};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Timeout for the tool auth sub-check. Short and fixed: a hanging tool
/// must not make the liveness endpoint hang with it.
const AUTH_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub ok: bool,
    /// Result of the optional tool auth sub-check.
    pub auth_check: AuthCheck,
}

/// Outcome of running `<tool> login --check` through the executor.
///
/// When the sub-check is disabled only `enabled` is present.
#[derive(Serialize)]
pub struct AuthCheck {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
}

/// GET /health -- service liveness, plus the tool auth sub-check when
/// enabled.
async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    if !state.config.health_auth_check_enabled {
        return Ok(Json(HealthResponse {
            ok: true,
            auth_check: AuthCheck {
                enabled: false,
                exit_code: None,
                auth_ok: None,
                duration_ms: None,
                stdout: None,
                stderr: None,
                timed_out: None,
            },
        }));
    }

    let result = exec::run(ExecRequest {
        argv: vec![
            state.config.artifact_tool_bin.clone(),
            "login".into(),
            "--check".into(),
        ],
        timeout: AUTH_CHECK_TIMEOUT,
        env: HashMap::new(),
    })
    .await?;

    let auth_ok = result.exit_code == 0 && !result.timed_out;
    Ok(Json(HealthResponse {
        ok: true,
        auth_check: AuthCheck {
            enabled: true,
            exit_code: Some(result.exit_code),
            auth_ok: Some(auth_ok),
            duration_ms: Some(result.duration_ms),
            stdout: Some(result.stdout),
            stderr: Some(result.stderr),
            timed_out: Some(result.timed_out),
        },
    }))
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
