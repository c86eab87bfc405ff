use std::path::PathBuf;
use std::time::Duration;

use execd_core::artifact::RetrieverConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Timeout applied to exec requests that do not specify one.
    pub default_timeout_secs: u64,
    /// Ceiling for caller-supplied exec timeouts.
    pub max_timeout_secs: u64,
    /// Whether `/health` runs the tool auth sub-check.
    pub health_auth_check_enabled: bool,
    /// Wall-clock budget for one artifact download.
    pub artifact_download_timeout_secs: u64,
    /// Scratch directory for transient artifact files.
    pub artifact_tmp_dir: PathBuf,
    /// External retrieval tool binary.
    pub artifact_tool_bin: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default              |
    /// |-------------------------------------|----------------------|
    /// | `HOST`                              | `0.0.0.0`            |
    /// | `PORT`                              | `3000`               |
    /// | `EXEC_MAX_BODY_BYTES`               | `1048576`            |
    /// | `EXEC_TIMEOUT_SECONDS_DEFAULT`      | `600`                |
    /// | `EXEC_MAX_TIMEOUT_SECONDS`          | `1800`               |
    /// | `HEALTH_AUTH_CHECK_ENABLED`         | `false`              |
    /// | `ARTIFACT_DOWNLOAD_TIMEOUT_SECONDS` | exec default timeout |
    /// | `ARTIFACT_TMP_DIR`                  | system temp dir      |
    /// | `ARTIFACT_TOOL_BIN`                 | `nlm`                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let max_body_bytes: usize = std::env::var("EXEC_MAX_BODY_BYTES")
            .unwrap_or_else(|_| "1048576".into())
            .parse()
            .expect("EXEC_MAX_BODY_BYTES must be a valid usize");

        let default_timeout_secs: u64 = std::env::var("EXEC_TIMEOUT_SECONDS_DEFAULT")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("EXEC_TIMEOUT_SECONDS_DEFAULT must be a valid u64");

        let max_timeout_secs: u64 = std::env::var("EXEC_MAX_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("EXEC_MAX_TIMEOUT_SECONDS must be a valid u64");

        let health_auth_check_enabled = env_bool("HEALTH_AUTH_CHECK_ENABLED", false);

        let artifact_download_timeout_secs: u64 =
            std::env::var("ARTIFACT_DOWNLOAD_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| default_timeout_secs.to_string())
                .parse()
                .expect("ARTIFACT_DOWNLOAD_TIMEOUT_SECONDS must be a valid u64");

        let artifact_tmp_dir = std::env::var("ARTIFACT_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let artifact_tool_bin =
            std::env::var("ARTIFACT_TOOL_BIN").unwrap_or_else(|_| "nlm".into());

        Self {
            host,
            port,
            max_body_bytes,
            default_timeout_secs,
            max_timeout_secs,
            health_auth_check_enabled,
            artifact_download_timeout_secs,
            artifact_tmp_dir,
            artifact_tool_bin,
        }
    }

    /// Retriever configuration derived from the server settings.
    pub fn retriever_config(&self) -> RetrieverConfig {
        RetrieverConfig {
            tool_bin: self.artifact_tool_bin.clone(),
            scratch_dir: self.artifact_tmp_dir.clone(),
            download_timeout: Duration::from_secs(self.artifact_download_timeout_secs),
        }
    }
}

/// Parse a boolean environment variable.
///
/// Accepts `1`, `true`, `yes`, `on` (case-insensitive, trimmed) as true;
/// anything else, or an unset variable, yields `default`.
fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
