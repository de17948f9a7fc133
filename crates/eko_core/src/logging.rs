//! File logging for the dashboard core.
//!
//! One rolling log per process under an absolute directory (10 MiB files,
//! five kept), plus a panic hook that records where a panic happened.
//!
//! # Invariants
//! - Lines carry metadata only: `event=... module=... status=...` with ids
//!   and counts. Task text, note bodies and e-mail addresses stay out.
//! - Panic payloads are flattened to one capped line with addresses
//!   redacted.
//! - Once running, a different level or directory is refused.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_BASENAME: &str = "eko";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_SUMMARY_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("valid email regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Case-insensitive; `warning` is accepted for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub dir: PathBuf,
}

impl LogConfig {
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, LoggingError> {
        let level = LogLevel::parse(level)
            .ok_or_else(|| LoggingError::UnsupportedLevel(level.trim().to_string()))?;
        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::EmptyDir);
        }
        let dir = PathBuf::from(trimmed);
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir));
        }
        Ok(Self { level, dir })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyDir,
    RelativeDir(PathBuf),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// flexi_logger refused the specification or could not open files.
    Backend(String),
    /// Logging already runs with another configuration.
    Reconfigure {
        active: LogConfig,
        requested: LogConfig,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyDir => write!(f, "log_dir cannot be empty"),
            Self::RelativeDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::Reconfigure { active, requested } => write!(
                f,
                "logging already running with level `{}` at `{}`; refusing to switch to level `{}` at `{}`",
                active.level,
                active.dir.display(),
                requested.level,
                requested.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Starts file logging, or confirms it already runs with the same settings.
///
/// # Errors
/// - Invalid level or directory (see [`LogConfig::parse`]).
/// - The directory cannot be created or the backend fails to start.
/// - [`LoggingError::Reconfigure`] when logging runs with other settings.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let requested = LogConfig::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start_logger(&requested))?;
    if active.config != requested {
        return Err(LoggingError::Reconfigure {
            active: active.config.clone(),
            requested,
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LogConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn start_logger(config: &LogConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.dir).map_err(|source| LoggingError::CreateDir {
        dir: config.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(config.level.as_str())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(config.dir.as_path())
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={} version={} build={} platform={}",
        config.level,
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" },
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            panic_summary(payload)
        );
        previous(info);
    }));
}

fn panic_summary(payload: &str) -> String {
    let flat = EMAIL_RE
        .replace_all(payload, "<email>")
        .replace(['\n', '\r'], " ");
    match flat.char_indices().nth(PANIC_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, panic_summary, LogConfig, LogLevel, LoggingError,
        PANIC_SUMMARY_CHARS,
    };

    #[test]
    fn level_parse_accepts_aliases_only() {
        assert_eq!(LogLevel::parse(" WARNING "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("Info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn config_rejects_blank_and_relative_dirs() {
        assert!(matches!(
            LogConfig::parse("info", "  "),
            Err(LoggingError::EmptyDir)
        ));
        assert!(matches!(
            LogConfig::parse("info", "logs/dev"),
            Err(LoggingError::RelativeDir(_))
        ));
        assert!(matches!(
            LogConfig::parse("loud", "/tmp/eko"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn panic_summary_redacts_addresses_on_one_line() {
        assert_eq!(
            panic_summary("no prospect for aino@example.com\r\nretry"),
            "no prospect for <email>  retry"
        );
        let long = panic_summary(&"ä".repeat(PANIC_SUMMARY_CHARS + 20));
        assert_eq!(long.chars().count(), PANIC_SUMMARY_CHARS + 3);
        assert!(long.ends_with("..."));
        assert_eq!(panic_summary("short"), "short");
    }

    #[test]
    fn init_is_idempotent_and_refuses_other_settings() {
        let dir = std::env::temp_dir().join(format!("eko-logging-{}", uuid::Uuid::new_v4()));
        let dir_text = dir.to_string_lossy().into_owned();
        let other = std::env::temp_dir().join(format!("eko-logging-{}", uuid::Uuid::new_v4()));

        init_logging("info", &dir_text).unwrap();
        init_logging(" INFO ", &dir_text).unwrap();

        let err = init_logging("debug", &dir_text).unwrap_err();
        assert!(matches!(err, LoggingError::Reconfigure { .. }));
        assert!(err.to_string().contains("refusing to switch"));
        assert!(matches!(
            init_logging("info", &other.to_string_lossy()),
            Err(LoggingError::Reconfigure { .. })
        ));

        let active = logging_status().unwrap();
        assert_eq!(active.level, LogLevel::Info);
        assert_eq!(active.dir, dir);
    }
}
