pub mod artifacts;
pub mod exec;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the service route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                 service health, optional tool auth sub-check
/// /exec                   run a shell command (POST)
/// /artifacts/download     fetch one artifact via the external tool
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(exec::router())
        .merge(artifacts::router())
}
