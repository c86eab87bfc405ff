//! Handlers for the `/artifacts` resource.
//!
//! Streams a downloaded artifact back to the caller with its sniffed
//! media type. The scratch file backing the stream is deleted when the
//! response body is dropped: after the transfer completes, when the
//! client aborts, or on any short-circuit before streaming begins.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use axum::{routing::get, Router};
use execd_core::artifact::{self, scratch::ScratchFile};
use futures::Stream;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /artifacts/download query parameters.
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub notebook_id: String,
    pub artifact_id: String,
    pub kind: String,
}

/// Response body stream that keeps the scratch-file guard alive for the
/// duration of the transfer.
///
/// Dropping the stream drops the guard, which removes the file.
struct CleanupStream {
    inner: ReaderStream<tokio::fs::File>,
    _guard: ScratchFile,
}

impl Stream for CleanupStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// GET /artifacts/download -- fetch one artifact through the external
/// tool and stream it back.
async fn download_artifact(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> AppResult<Response> {
    let config = state.config.retriever_config();
    let retrieved = artifact::retrieve(
        &config,
        &params.notebook_id,
        &params.artifact_id,
        &params.kind,
    )
    .await?;

    // An open failure here drops the guard, deleting the file before the
    // error response leaves the handler.
    let file = tokio::fs::File::open(retrieved.file.path())
        .await
        .map_err(|err| AppError::InternalError(format!("failed to open artifact: {err}")))?;

    let stream = CleanupStream {
        inner: ReaderStream::new(file),
        _guard: retrieved.file,
    };

    Response::builder()
        .header(header::CONTENT_TYPE, retrieved.media_type.mime())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", retrieved.file_name),
        )
        .body(Body::from_stream(stream))
        .map_err(|err| AppError::InternalError(format!("failed to build response: {err}")))
}

/// Mount artifact routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/artifacts/download", get(download_artifact))
}
