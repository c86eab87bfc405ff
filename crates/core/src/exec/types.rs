//! Execution request/result types and errors.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exit code reported for a command that was killed due to timeout.
///
/// The real exit status of the killed process is discarded in favor of
/// this sentinel; consumers rely on `exit_code == 124` as a simple
/// timed-out check.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// A single command execution request.
///
/// Immutable once submitted. The caller is responsible for clamping
/// `timeout` to its configured ceiling before constructing the request.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Command and arguments, in order. Must be non-empty.
    pub argv: Vec<String>,
    /// Maximum wall-clock time before termination escalation begins.
    pub timeout: Duration,
    /// Environment variable overrides, overlaid on the ambient
    /// environment of this process. Never mutates the ambient
    /// environment, so concurrent requests cannot interfere.
    pub env: HashMap<String, String>,
}

/// Normalized outcome of one command execution.
///
/// Produced exactly once per [`ExecRequest`]; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    /// Process exit code. [`TIMEOUT_EXIT_CODE`] when `timed_out` is set,
    /// `-1` when the process was killed by an unrelated signal.
    pub exit_code: i32,
    /// Complete stdout captured from the process (lossy UTF-8).
    pub stdout: String,
    /// Complete stderr captured from the process (lossy UTF-8).
    pub stderr: String,
    /// Wall-clock duration in milliseconds, spawn to final collection,
    /// including any termination-escalation delay.
    pub duration_ms: u64,
    /// Spawn timestamp, UTC ISO-8601.
    pub started_at: String,
    /// Collection timestamp, UTC ISO-8601.
    pub finished_at: String,
    /// Whether the command was killed because its timeout elapsed.
    pub timed_out: bool,
}

/// Errors that can occur while starting or supervising a command.
///
/// A non-zero exit code or a timeout is a normal [`ExecResult`], not an
/// error; this type only covers failures to produce a result at all.
#[derive(Debug)]
pub enum ExecError {
    /// The request's argv was empty.
    EmptyCommand,
    /// An I/O error occurred while spawning or waiting on the process.
    Io(std::io::Error),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCommand => write!(f, "command must not be empty"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::EmptyCommand => None,
        }
    }
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty_command() {
        let err = ExecError::EmptyCommand;
        assert_eq!(err.to_string(), "command must not be empty");
    }

    #[test]
    fn display_io_error() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary");
        let err = ExecError::Io(inner);
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("no such binary"));
    }

    #[test]
    fn error_source_io() {
        let err = ExecError::Io(std::io::Error::other("boom"));
        assert!(
            std::error::Error::source(&err).is_some(),
            "Io variant should have a source"
        );
    }

    #[test]
    fn error_source_none_for_empty_command() {
        assert!(
            std::error::Error::source(&ExecError::EmptyCommand).is_none(),
            "EmptyCommand variant should have no source"
        );
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = ExecResult {
            exit_code: 0,
            stdout: "out".into(),
            stderr: String::new(),
            duration_ms: 12,
            started_at: "2026-01-01T00:00:00+00:00".into(),
            finished_at: "2026-01-01T00:00:01+00:00".into(),
            timed_out: false,
        };
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("\"exit_code\":0"));
        assert!(json.contains("\"timed_out\":false"));
    }
}
