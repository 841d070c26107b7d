//! Logging setup.
//!
//! The TUI owns the terminal, so interactive runs log to a daily-rolling
//! JSON file only. One-shot commands (`--check`) log pretty text to stderr.
//! Standard `log` macros are bridged into `tracing` in both modes.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::AppConfig;

/// File name prefix for the rolling log.
pub const LOG_FILE_PREFIX: &str = "legalmate.log";

/// Build the filter: `RUST_LOG` wins, then the configured level.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

fn bridge_log_crate() {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {e}");
    }
}

fn ensure_dir(log_dir: &Path) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {e}");
        }
    }
}

/// Initialize logging for TUI mode.
///
/// All output goes to `<log dir>/legalmate.log.YYYY-MM-DD` as JSON lines.
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered records are flushed on shutdown.
pub fn init_tui(config: &AppConfig) -> WorkerGuard {
    let log_dir = config.log_dir();
    ensure_dir(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter(&config.log.level));

    // No stdout layer: ratatui is in raw/alternate-screen mode.
    let subscriber = tracing_subscriber::registry().with(file_layer);

    bridge_log_crate();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

/// Initialize logging to stderr for non-interactive commands.
pub fn init_stderr(config: &AppConfig) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .pretty()
        .with_filter(env_filter(&config.log.level));

    let subscriber = tracing_subscriber::registry().with(stderr_layer);

    bridge_log_crate();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }
}
