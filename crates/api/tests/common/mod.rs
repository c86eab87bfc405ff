//! Shared harness for API integration tests.
//!
//! Builds the full application router (identical middleware stack to the
//! production binary) around a scratch directory and a stub external
//! tool, then drives it in-process via `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use execd_api::config::ServerConfig;
use execd_api::router::build_app_router;
use execd_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// The scratch directory and tool binary point into the caller's temp
/// directory so tests never touch shared system paths.
pub fn test_config(scratch_dir: PathBuf, tool_bin: String) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_body_bytes: 1024 * 1024,
        default_timeout_secs: 30,
        max_timeout_secs: 60,
        health_auth_check_enabled: false,
        artifact_download_timeout_secs: 10,
        artifact_tmp_dir: scratch_dir,
        artifact_tool_bin: tool_bin,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (request ID, tracing, body
/// limit, panic recovery) that production uses.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Write an executable stub tool script into `dir` and return its path.
///
/// The stub stands in for the external retrieval tool; its body receives
/// the real download argv.
pub fn write_stub_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).expect("create stub tool");
    writeln!(f, "#!/bin/bash").expect("write shebang");
    write!(f, "{body}").expect("write stub body");
    drop(f);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Issue a POST request with a raw body against the app.
pub async fn post_raw(app: Router, uri: &str, body: String) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("build request"),
    )
    .await
    .expect("send request")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}
