//! Scratch-file ownership guard.

use std::path::{Path, PathBuf};

/// Owns a transient file in the scratch directory and deletes it exactly
/// once, when the guard is dropped.
///
/// The retriever creates the guard before invoking the external tool, so
/// every failure path releases a partial file simply by returning. On
/// success the guard travels inside the retrieved artifact to the
/// response boundary, which holds it until streaming completes or
/// aborts.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of the (possibly not-yet-created) file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        // The file may never have been created (tool failed before
        // writing) or may already be gone; both are fine.
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove scratch file");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
