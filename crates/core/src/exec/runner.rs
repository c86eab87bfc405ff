//! Subprocess supervision: spawn, output capture, timeout, escalation.
//!
//! The child is placed in its own process group so that termination
//! signals reach its entire subtree. On timeout the group receives
//! SIGTERM, then SIGKILL after a fixed grace window if it is still
//! alive. Output captured up to the point of forced exit is retained.

use std::process::Stdio;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use super::types::{ExecError, ExecRequest, ExecResult, TIMEOUT_EXIT_CODE};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Output exceeding this limit is truncated to prevent memory exhaustion
/// from extremely verbose commands.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Fixed delay between the graceful termination signal and the forceful
/// kill of a timed-out process group.
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Signals the runner can deliver to a process group.
#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    /// Graceful termination (SIGTERM).
    Terminate,
    /// Forceful kill (SIGKILL). Assumed always effective.
    Kill,
}

/// Spawn the requested command, capture its output, and enforce the
/// timeout.
///
/// Exactly one child process is spawned per call. The child runs in its
/// own process group with stdout/stderr piped and stdin closed. The
/// returned [`ExecResult`] reflects either the real exit status or, on
/// timeout, the sentinel [`TIMEOUT_EXIT_CODE`] with `timed_out` set.
pub async fn run(request: ExecRequest) -> Result<ExecResult, ExecError> {
    let program = request
        .argv
        .first()
        .ok_or(ExecError::EmptyCommand)?
        .clone();

    let started_at = now_iso();
    let started = Instant::now();

    let mut cmd = Command::new(&program);
    cmd.args(&request.argv[1..])
        .envs(&request.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // The child must not outlive a cancelled caller (e.g. a dropped
        // connection aborting the handler future mid-wait).
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn()?;
    let pid = child.id();

    // Take stdout/stderr handles and read them in spawned tasks so we can
    // still call `child.wait()` (which borrows `&mut child`).
    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let (exit_code, timed_out) =
        match tokio::time::timeout(request.timeout, child.wait()).await {
            Ok(status) => (status?.code().unwrap_or(-1), false),
            Err(_elapsed) => {
                escalate(&mut child, pid).await?;
                (TIMEOUT_EXIT_CODE, true)
            }
        };

    // The reader tasks complete once every group member holding the pipe
    // has exited, so collection happens strictly after process death.
    let stdout_bytes = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();
    let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
    let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();

    let duration_ms = started.elapsed().as_millis() as u64;
    let finished_at = now_iso();

    tracing::info!(
        command = %program,
        exit_code,
        duration_ms,
        timed_out,
        "command finished"
    );

    Ok(ExecResult {
        exit_code,
        stdout,
        stderr,
        duration_ms,
        started_at,
        finished_at,
        timed_out,
    })
}

/// Two-step termination of a timed-out process group.
///
/// SIGTERM first, then SIGKILL if the child is still alive after
/// [`TERM_GRACE`]. Signals are strictly ordered. The wait after SIGKILL
/// is unbounded; a forceful kill must eventually succeed on a correctly
/// functioning host.
async fn escalate(child: &mut Child, pid: Option<u32>) -> Result<(), ExecError> {
    signal_group(pid, GroupSignal::Terminate);
    match tokio::time::timeout(TERM_GRACE, child.wait()).await {
        Ok(status) => {
            // Exited within the grace window; the real status is
            // discarded in favor of the timeout sentinel.
            status?;
        }
        Err(_elapsed) => {
            signal_group(pid, GroupSignal::Kill);
            // Direct-child fallback for platforms without group kill.
            let _ = child.start_kill();
            child.wait().await?;
        }
    }
    Ok(())
}

/// Deliver `signal` to the process group led by `pid`.
///
/// The runner spawns children as their own group leaders, so the child
/// pid doubles as the group id.
#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: GroupSignal) {
    let Some(pid) = pid else { return };
    let sig = match signal {
        GroupSignal::Terminate => libc::SIGTERM,
        GroupSignal::Kill => libc::SIGKILL,
    };
    unsafe {
        libc::killpg(pid as libc::pid_t, sig);
    }
}

#[cfg(not(unix))]
fn signal_group(_pid: Option<u32>, _signal: GroupSignal) {
    // No process-group signaling; `escalate` falls back to killing the
    // direct child via the process handle.
}

/// Read an entire output stream into a byte buffer, capped at
/// [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

/// Current time as a UTC ISO-8601 string with microsecond precision.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
