//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start rolling file logs (optionally echoed to stderr) once per process.
//! - Record panics as single-line log events.
//!
//! # Invariants
//! - A second `init_logging` call with identical settings is a no-op.
//! - A second call with different settings is rejected; the first logger stays.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "batchledger";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SUMMARY_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

/// Console echo setting for `init_logging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    /// Write to the rolling log files only.
    #[default]
    FilesOnly,
    /// Also echo `info` and above to stderr.
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    dir: PathBuf,
    echo: EchoMode,
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

impl LogSettings {
    fn parse(level: &str, log_dir: &str, echo: EchoMode) -> Result<Self, String> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "warning" => LevelFilter::Warn,
            "off" | "" => return Err(format!("unsupported log level `{level}`")),
            other => LevelFilter::from_str(other)
                .map_err(|_| format!("unsupported log level `{level}`"))?,
        };

        let dir = PathBuf::from(log_dir.trim());
        if dir.as_os_str().is_empty() || !dir.is_absolute() {
            return Err(format!("log directory must be an absolute path, got `{log_dir}`"));
        }

        Ok(Self { level, dir, echo })
    }

    fn start(&self) -> Result<LoggerHandle, String> {
        std::fs::create_dir_all(&self.dir).map_err(|err| {
            format!("cannot create log directory `{}`: {err}", self.dir.display())
        })?;

        let spec = self.level.as_str().to_ascii_lowercase();
        Logger::try_with_str(&spec)
            .map_err(|err| format!("invalid log spec `{spec}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(self.dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .duplicate_to_stderr(match self.echo {
                EchoMode::FilesOnly => Duplicate::None,
                EchoMode::Stderr => Duplicate::Info,
            })
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))
    }
}

/// Starts process-wide logging.
///
/// `level` is one of `trace|debug|info|warn|error` (case-insensitive);
/// `log_dir` must be absolute and is created when missing.
///
/// # Errors
/// - Unsupported level or non-absolute directory.
/// - Logging already running with different settings.
/// - The logger backend failed to start.
pub fn init_logging(level: &str, log_dir: &str, echo: EchoMode) -> Result<(), String> {
    let requested = LogSettings::parse(level, log_dir, echo)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| -> Result<ActiveLogger, String> {
        let handle = requested.start()?;
        install_panic_hook();
        info!(
            "event=logging_init module=core status=ok level={} log_dir={} echo={:?} version={}",
            requested.level,
            requested.dir.display(),
            requested.echo,
            env!("CARGO_PKG_VERSION")
        );
        Ok(ActiveLogger {
            settings: requested.clone(),
            _handle: handle,
        })
    })?;

    if active.settings != requested {
        return Err(format!(
            "logging already running with level={} dir=`{}`; refusing level={} dir=`{}`",
            active.settings.level,
            active.settings.dir.display(),
            requested.level,
            requested.dir.display()
        ));
    }
    Ok(())
}

/// Returns the default log level: `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            single_line(&payload, PANIC_SUMMARY_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens to one line and caps at `max_chars`, marking the cut with `...`.
fn single_line(value: &str, max_chars: usize) -> String {
    let mut flat: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max_chars)
        .collect();
    if value.chars().nth(max_chars).is_some() {
        flat.push_str("...");
    }
    flat
}
