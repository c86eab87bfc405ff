//! Command execution with timeout and termination escalation.
//!
//! [`run`] spawns a command in its own process group, enforces a
//! wall-clock timeout, and normalizes the outcome into an [`ExecResult`].
//! A timed-out command is reported with the sentinel exit code
//! [`TIMEOUT_EXIT_CODE`] rather than as an error.

pub mod runner;
pub mod types;

pub use runner::run;
pub use types::{ExecError, ExecRequest, ExecResult, TIMEOUT_EXIT_CODE};
