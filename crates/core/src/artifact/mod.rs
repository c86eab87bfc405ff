//! Artifact retrieval through the external download tool.
//!
//! Validates caller-supplied identifiers, drives the tool through the
//! command executor, classifies failures (absent artifact vs generic
//! tool failure), and guarantees that no partial output file survives a
//! failed retrieval.

pub mod scratch;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use crate::exec::{self, ExecError, ExecRequest, ExecResult};
use crate::media::{self, MediaType};
use scratch::ScratchFile;

/// Output markers treated as "the artifact does not exist".
///
/// Heuristic substring matching on free-text tool output; fragile and
/// tool-version dependent by nature. Kept in one place so the policy is
/// replaceable; do not extend speculatively.
const NOT_FOUND_MARKERS: [&str; 4] = ["not found", "no such", "does not exist", "404"];

/// Configuration for the retriever, supplied per call site.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// External tool binary (name resolved via `PATH`, or a path).
    pub tool_bin: String,
    /// Shared directory for transient output files.
    pub scratch_dir: PathBuf,
    /// Wall-clock budget for one download command.
    pub download_timeout: Duration,
}

/// A successfully retrieved artifact, ready for streaming.
#[derive(Debug)]
pub struct RetrievedArtifact {
    /// Guard owning the downloaded file; deletion fires on drop.
    pub file: ScratchFile,
    /// Content-sniffed media type.
    pub media_type: MediaType,
    /// Suggested download name: the artifact id plus the detected
    /// extension, or the bare id for unrecognized content.
    pub file_name: String,
}

/// Errors from the artifact retrieval flow.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// An identifier failed whitelist validation. Rejected before any
    /// filesystem or process activity.
    #[error("{0}")]
    Validation(String),

    /// The tool reported failure and its output indicates the artifact
    /// does not exist.
    #[error("artifact not found")]
    NotFound,

    /// The tool failed for any other reason, including timeout.
    #[error("artifact download failed (exit code {exit_code}, timed out {timed_out}): {stderr}")]
    Retrieval {
        exit_code: i32,
        timed_out: bool,
        stderr: String,
    },

    /// The tool reported success but did not produce the output file.
    #[error("artifact output not created")]
    Integrity,

    /// The executor failed to run the tool at all.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Scratch-directory or post-download I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validate an identifier against the whitelist alphabet
/// (ASCII letters, digits, hyphen, underscore).
pub fn validate_identifier(value: &str, label: &str) -> Result<(), ArtifactError> {
    if value.is_empty() {
        return Err(ArtifactError::Validation(format!("{label} is required")));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ArtifactError::Validation(format!("invalid {label}")));
    }
    Ok(())
}

/// Download one artifact via the external tool.
///
/// On success the returned [`RetrievedArtifact`] owns the output file;
/// the caller must keep it alive until it has finished reading. On every
/// failure path the output file (if partially created) is deleted before
/// this function returns.
pub async fn retrieve(
    config: &RetrieverConfig,
    notebook_id: &str,
    artifact_id: &str,
    kind: &str,
) -> Result<RetrievedArtifact, ArtifactError> {
    validate_identifier(notebook_id, "notebook_id")?;
    validate_identifier(artifact_id, "artifact_id")?;
    validate_identifier(kind, "kind")?;

    tokio::fs::create_dir_all(&config.scratch_dir).await?;

    // Random suffix keeps concurrent retrievals of the same artifact
    // from colliding in the shared scratch directory.
    let outfile = config.scratch_dir.join(format!(
        "nlm-artifact-{artifact_id}-{}",
        Uuid::new_v4().simple()
    ));
    let outfile = ScratchFile::new(outfile);

    let request = ExecRequest {
        argv: vec![
            config.tool_bin.clone(),
            "download".into(),
            kind.into(),
            notebook_id.into(),
            "--id".into(),
            artifact_id.into(),
            "--output".into(),
            outfile.path().display().to_string(),
        ],
        timeout: config.download_timeout,
        env: HashMap::new(),
    };
    let result = exec::run(request).await?;

    if result.exit_code != 0 || result.timed_out {
        // `outfile` is dropped on return, removing any partial output.
        if looks_like_not_found(&result) {
            return Err(ArtifactError::NotFound);
        }
        return Err(ArtifactError::Retrieval {
            exit_code: result.exit_code,
            timed_out: result.timed_out,
            stderr: result.stderr,
        });
    }

    if !tokio::fs::try_exists(outfile.path()).await? {
        return Err(ArtifactError::Integrity);
    }

    let media_type = media::sniff(outfile.path()).await?;
    let file_name = format!("{artifact_id}{}", media_type.extension());

    tracing::debug!(
        artifact_id,
        media_type = media_type.mime(),
        "artifact retrieved"
    );

    Ok(RetrievedArtifact {
        file: outfile,
        media_type,
        file_name,
    })
}

/// Absence classification policy for failed downloads.
///
/// Scans the combined stdout/stderr text case-insensitively for the
/// known absence markers.
fn looks_like_not_found(result: &ExecResult) -> bool {
    let text = format!("{}\n{}", result.stdout, result.stderr).to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| text.contains(marker))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
