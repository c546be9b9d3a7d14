//! Process-wide log sink.
//!
//! # Responsibility
//! - Route `log` records to size-rotated files under one directory.
//! - Record panics as single-line log events before the default hook runs.
//!
//! # Invariants
//! - The sink starts at most once; repeating the same target is a no-op.
//! - A second start with another level or directory fails instead of
//!   silently reconfiguring.
//! - Starting the sink never panics.
//! - Core events are `key=value` metadata; attribute values are never logged.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "dirkit";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const RETAINED_FILES: usize = 7;
const PANIC_EXCERPT_CHARS: usize = 160;

static ACTIVE_SINK: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Level and directory a sink writes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogTarget {
    /// Validates a textual level and an absolute directory.
    pub fn parse(level: &str, dir: &str) -> Result<Self, LoggingError> {
        Ok(Self {
            level: normalize_level(level)?,
            dir: normalize_log_dir(dir)?,
        })
    }
}

struct ActiveSink {
    target: LogTarget,
    _handle: LoggerHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    EmptyDir,
    RelativeDir(String),
    CreateDir { dir: PathBuf, message: String },
    Start(String),
    Conflict { active: LogTarget, requested: LogTarget },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "log level `{level}` is not one of trace|debug|info|warn|error"
            ),
            Self::EmptyDir => write!(f, "log directory is empty"),
            Self::RelativeDir(dir) => write!(f, "log directory `{dir}` is not absolute"),
            Self::CreateDir { dir, message } => {
                write!(f, "cannot create log directory `{}`: {message}", dir.display())
            }
            Self::Start(message) => write!(f, "log sink did not start: {message}"),
            Self::Conflict { active, requested } => write!(
                f,
                "log sink already writes {} to `{}`; cannot switch to {} at `{}`",
                active.level,
                active.dir.display(),
                requested.level,
                requested.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts the file sink at `level` under the absolute `log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    start(LogTarget::parse(level, log_dir)?)
}

/// Starts the file sink described by `config`.
///
/// Returns `Ok(false)` and does nothing when `log_dir` is unset.
pub fn init_logging_from(config: &CoreConfig) -> Result<bool, LoggingError> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(false);
    };
    init_logging(&config.log_level, dir)?;
    Ok(true)
}

/// Target of the running sink, if any.
pub fn logging_status() -> Option<LogTarget> {
    ACTIVE_SINK.get().map(|sink| sink.target.clone())
}

/// Level used when configuration names none.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(requested: LogTarget) -> Result<(), LoggingError> {
    let sink = ACTIVE_SINK.get_or_try_init(|| open_sink(requested.clone()))?;
    if sink.target == requested {
        return Ok(());
    }
    Err(LoggingError::Conflict {
        active: sink.target.clone(),
        requested,
    })
}

fn open_sink(target: LogTarget) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(&target.dir).map_err(|err| LoggingError::CreateDir {
        dir: target.dir.clone(),
        message: err.to_string(),
    })?;

    let files = FileSpec::default()
        .directory(&target.dir)
        .basename(LOG_BASENAME);
    let handle = Logger::try_with_str(target.level.as_str().to_ascii_lowercase())
        .map_err(|err| LoggingError::Start(err.to_string()))?
        .log_to_file(files)
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(RETAINED_FILES),
        )
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Start(err.to_string()))?;

    if PANIC_HOOK.set(()).is_ok() {
        install_panic_hook();
    }
    log::info!(
        "event=core_init module=logging status=ok level={} log_dir={} version={}",
        target.level,
        target.dir.display(),
        env!("CARGO_PKG_VERSION")
    );
    Ok(ActiveSink {
        target,
        _handle: handle,
    })
}

pub(crate) fn normalize_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let lowered = level.trim().to_ascii_lowercase();
    let filter = match lowered.as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => return Err(LoggingError::UnknownLevel(lowered)),
    };
    Ok(filter)
}

pub(crate) fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let dir = Path::new(log_dir.trim());
    if dir.as_os_str().is_empty() {
        Err(LoggingError::EmptyDir)
    } else if dir.is_relative() {
        Err(LoggingError::RelativeDir(dir.display().to_string()))
    } else {
        Ok(dir.to_path_buf())
    }
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        log::error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            excerpt(&panic_text(info), PANIC_EXCERPT_CHARS)
        );
        chained(info);
    }));
}

fn panic_text(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<opaque payload>".to_string())
}

// Panic text may quote attribute values; flatten it and cap its length.
fn excerpt(text: &str, limit: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        excerpt, init_logging, init_logging_from, logging_status, normalize_level,
        normalize_log_dir, LoggingError,
    };
    use crate::config::CoreConfig;
    use log::LevelFilter;

    #[test]
    fn levels_are_case_insensitive_with_warning_alias() {
        assert_eq!(normalize_level("INFO").expect("INFO"), LevelFilter::Info);
        assert_eq!(normalize_level(" warning ").expect("warning"), LevelFilter::Warn);
        assert_eq!(
            normalize_level("verbose").expect_err("unknown level"),
            LoggingError::UnknownLevel("verbose".to_string())
        );
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        assert!(matches!(
            normalize_log_dir("logs/dev").expect_err("relative"),
            LoggingError::RelativeDir(_)
        ));
        assert_eq!(
            normalize_log_dir("  ").expect_err("empty"),
            LoggingError::EmptyDir
        );
    }

    #[test]
    fn excerpt_flattens_lines_and_caps_length() {
        let text = excerpt("uid=jdoe\nsn=Doe\rgivenname=John", 8);
        assert_eq!(text, "uid=jdoe...");
        assert_eq!(excerpt("a\nb", 8), "a b");
    }

    #[test]
    fn config_without_dir_starts_nothing() {
        let started = init_logging_from(&CoreConfig::default()).expect("no-op init");
        assert!(!started);
    }

    #[test]
    fn second_start_must_match_first() {
        let base = tempfile::tempdir().expect("temp dir");
        let log_dir = base.path().join("logs");
        let log_dir_str = log_dir.to_str().expect("utf-8 temp dir").to_string();
        let other_dir_str = base
            .path()
            .join("other")
            .to_str()
            .expect("utf-8 temp dir")
            .to_string();

        init_logging("info", &log_dir_str).expect("first start");
        init_logging("INFO", &log_dir_str).expect("same target");

        let err = init_logging("debug", &log_dir_str).expect_err("level conflict");
        assert!(matches!(err, LoggingError::Conflict { .. }));
        let err = init_logging("info", &other_dir_str).expect_err("dir conflict");
        assert!(err.to_string().contains("cannot switch"));

        let target = logging_status().expect("sink running");
        assert_eq!(target.level, LevelFilter::Info);
        assert_eq!(target.dir, log_dir);
    }
}
