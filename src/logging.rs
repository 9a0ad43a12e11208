//! Log sink setup.
//!
//! Output goes to the file named by `zabbix2opsgenie.logFile` when it is
//! configured, otherwise to stderr. The level comes from the `logger` key.

use crate::config::{Config, ConfigError};
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Maps a configured level name to a filter directive. Unknown names fall
/// back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "warning" | "warn" => "warn",
        "error" => "error",
        "trace" => "trace",
        _ => "info",
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes buffered log lines when dropped, so it must be
/// held until the process is about to exit.
pub fn init(config: &Config) -> Result<WorkerGuard, ConfigError> {
    let filter = EnvFilter::new(level_directive(&config.logger));

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let log_to_file = config.log_file.is_some();
    // A subscriber may already be installed (e.g. by a test harness).
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!log_to_file)
        .with_target(false)
        .try_init();

    Ok(guard)
}
