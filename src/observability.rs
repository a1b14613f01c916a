//! Logging and observability helpers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "append_only_filter.log";

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    let log_dir = config.directory.clone();
    let result = match (&log_dir, config.json) {
        (Some(dir), json) => {
            let _ = fs::create_dir_all(dir);

            // 1. Clean up old logs
            if let Err(e) = cleanup_old_logs(dir, config.retention_days) {
                eprintln!("Failed to clean up old logs: {}", e);
            }

            // 2. Setup file appender
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let builder = builder.with_writer(file_appender).with_ansi(false);
            if json {
                builder.json().with_current_span(true).try_init()
            } else {
                builder.try_init()
            }
        }
        (None, true) => builder
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .try_init(),
        (None, false) => builder.with_writer(std::io::stderr).try_init(),
    };

    if result.is_ok() {
        tracing::info!(
            "Tracing initialized. Logs directory: {:?}",
            log_dir.unwrap_or_else(|| PathBuf::from("<stderr>"))
        );
    }
}

/// Default directory for rolled log files
pub fn default_log_directory() -> PathBuf {
    let mut path = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default();
    path.push("append_only_filter");
    path.push("logs");
    path
}

fn cleanup_old_logs(log_dir: &Path, retention_days: u64) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let is_ours = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(LOG_FILE_PREFIX))
            .unwrap_or(false);
        if !is_ours {
            continue;
        }

        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());

        if matches!(age, Some(age) if age > retention) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!("Failed to remove old log file {:?}: {}", path, e),
            }
        }
    }
    Ok(removed)
}
