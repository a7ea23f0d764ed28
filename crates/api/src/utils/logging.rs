//! Logging configuration using tracing
//!
//! Structured logs go to stderr (human-readable or JSON) and to a
//! daily-rolling file in the configured log directory.

use std::path::PathBuf;

use anyhow::Context;
use punchsync_domain::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Options taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub json: bool,
}

/// `RUST_LOG` wins; otherwise `debug` when verbose, `info` when not.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the tracing subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. Returns `None` when a subscriber was already
/// installed.
///
/// # Errors
/// Fails when the log directory cannot be created or written.
pub fn init(options: LogOptions, config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let directory = config.directory.clone().unwrap_or_else(|| PathBuf::from("."));
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_name.as_str())
        .build(&directory)
        .with_context(|| format!("cannot open log file in {}", directory.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_text =
        (!options.json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));
    let stderr_json = options.json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    let installed = tracing_subscriber::registry()
        .with(env_filter(options.verbose))
        .with(stderr_text)
        .with(stderr_json)
        .with(file_layer)
        .try_init()
        .is_ok();

    Ok(installed.then_some(guard))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().to_path_buf()),
            ..LoggingConfig::default()
        };

        let first = init(LogOptions::default(), &config).unwrap();
        let second = init(LogOptions { verbose: true, json: true }, &config).unwrap();

        // Only one global subscriber can be installed per process
        assert!(first.is_none() || second.is_none());

        tracing::info!(record_count = 3, endpoint = "http://localhost", "structured event");
    }
}
