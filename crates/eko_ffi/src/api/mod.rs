//! FFI use-case API for the dashboard UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the UI via FRB.
//! - Resolve the storage path and open a fresh connection per call.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as `ok=false` envelopes with a readable message.
//! - Payloads are JSON documents so the UI can decode them with its own
//!   model classes.

pub mod boards;
pub mod crm;
pub mod library;

use eko_core::db::open_db;
use eko_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "eko_dashboard.sqlite3";
const DB_PATH_ENV: &str = "EKO_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by every later call.
///
/// Must run before the first DB-backed call. Repeating the same path is a
/// no-op; a different path after the first call is rejected.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path must not be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already set to `{}`; cannot switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generic response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// JSON payload on success, when the call returns data.
    pub payload_json: Option<String>,
}

impl ApiResponse {
    fn success(message: impl Into<String>, payload_json: Option<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            payload_json,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            payload_json: None,
        }
    }
}

/// Wraps a use-case result into an envelope, serializing the payload.
pub(crate) fn respond<T: Serialize>(
    op: &str,
    success_message: &str,
    result: Result<T, String>,
) -> ApiResponse {
    match result {
        Ok(value) => match serde_json::to_string(&value) {
            Ok(json) => ApiResponse::success(success_message, Some(json)),
            Err(err) => {
                log::error!("event=ffi_call module=ffi status=error op={op} reason=encode");
                ApiResponse::failure(format!("{op} failed: {err}"))
            }
        },
        Err(err) => ApiResponse::failure(format!("{op} failed: {err}")),
    }
}

pub(crate) fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

pub(crate) fn with_connection<T>(
    f: impl FnOnce(&Connection) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

pub(crate) fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid {field}: `{raw}`"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::configure_db_path;
    use std::sync::OnceLock;
    use tempfile::TempDir;

    static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

    /// Points every test in this process at one scratch database.
    pub(crate) fn use_temp_db() {
        let dir = TEST_DIR.get_or_init(|| TempDir::new().expect("create temp dir"));
        let path = dir.path().join("eko_ffi_test.sqlite3");
        let error = configure_db_path(path.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    pub(crate) fn unique_user(prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }

    pub(crate) fn payload(json: &Option<String>) -> serde_json::Value {
        serde_json::from_str(json.as_deref().expect("payload present")).expect("valid json")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::use_temp_db;
    use super::{configure_db_path, core_version, init_logging, parse_id, ping, resolve_db_path};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_db_path_is_sticky() {
        use_temp_db();
        let active = resolve_db_path();
        assert!(configure_db_path(active.to_string_lossy().into_owned()).is_empty());
        assert!(!configure_db_path("/elsewhere/other.sqlite3".to_string()).is_empty());
        assert!(!configure_db_path("   ".to_string()).is_empty());
    }

    #[test]
    fn parse_id_names_the_field() {
        let error = parse_id("nope", "task_id").expect_err("not a uuid");
        assert!(error.contains("task_id"));
    }
}
