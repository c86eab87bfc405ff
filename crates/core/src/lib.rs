//! execd core domain logic.
//!
//! Process execution with group-wide termination escalation, artifact
//! retrieval through an external command-line tool, and byte-signature
//! media type detection. All subprocess management is pure (no HTTP
//! concerns) and lives in this crate for isolation and testability.

pub mod artifact;
pub mod exec;
pub mod media;
