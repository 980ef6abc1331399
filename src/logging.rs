//! Structured JSONL logging plus human-readable stderr output.
//!
//! The library only emits `tracing` events; binaries call `init` once.
//!
//! - **JSONL to file** (`<log_dir>/navigatorx.jsonl`) - structured for tooling
//! - **Compact to stderr** - for humans
//!
//! # Usage
//!
//! ```rust,ignore
//! // Keep the guard alive for the duration of the program
//! let _guard = navigatorx::logging::init(&navigatorx::logging::default_log_dir());
//! tracing::info!(event_type = "app_start", "Started");
//! ```

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "navigatorx.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Install the dual-output subscriber.
///
/// Falls back to a sink when the log file cannot be opened, so logging
/// setup never aborts the program.
pub fn init(log_dir: &Path) -> LoggingGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    let (non_blocking_file, file_guard) =
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => tracing_appender::non_blocking(file),
            Err(e) => {
                eprintln!("[LOGGING] Failed to open log file: {}", e);
                tracing_appender::non_blocking(io::sink())
            }
        };

    // Default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    // A second init (e.g. in tests) keeps the first subscriber.
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            event_type = "app_lifecycle",
            action = "started",
            log_path = %log_path.display(),
            "Logging initialized"
        );
    }

    LoggingGuard {
        _file_guard: file_guard,
        log_path,
    }
}

/// Log directory (~/.navigatorx/logs/), or the temp dir without a home.
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".navigatorx").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("navigatorx-logs"))
}
