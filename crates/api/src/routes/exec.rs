use std::collections::HashMap;
use std::time::Duration;

use axum::extract::State;
use axum::{routing::post, Json, Router};
use execd_core::exec::{self, ExecRequest, ExecResult};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /exec request body.
#[derive(Debug, Deserialize)]
pub struct ExecBody {
    /// Shell script to run via `bash -lc`.
    pub script: String,
    /// Requested timeout in seconds (minimum 1). Defaults to the
    /// configured default and is clamped to the configured maximum.
    pub timeout_seconds: Option<u64>,
    /// Environment variable overrides for the child process.
    pub env: Option<HashMap<String, String>>,
}

/// POST /exec -- run a shell command and return its normalized result.
async fn exec_script(
    State(state): State<AppState>,
    Json(body): Json<ExecBody>,
) -> AppResult<Json<ExecResult>> {
    if body.script.is_empty() {
        return Err(AppError::BadRequest("script is required".into()));
    }
    if body.timeout_seconds == Some(0) {
        return Err(AppError::BadRequest(
            "timeout_seconds must be at least 1".into(),
        ));
    }

    let timeout_secs = body
        .timeout_seconds
        .unwrap_or(state.config.default_timeout_secs)
        .min(state.config.max_timeout_secs);

    let result = exec::run(ExecRequest {
        argv: vec!["bash".into(), "-lc".into(), body.script],
        timeout: Duration::from_secs(timeout_secs),
        env: body.env.unwrap_or_default(),
    })
    .await?;

    Ok(Json(result))
}

/// Mount exec routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/exec", post(exec_script))
}
