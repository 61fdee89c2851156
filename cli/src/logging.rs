//! Logging initialization and configuration for fq.

use anyhow::{Context, Result};
use fq_core::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

/// Initialize the tracing subscriber.
///
/// Console output always goes to stderr, since stdout carries the JSON
/// payload. By default only WARN and ERROR are shown; set `RUST_LOG` to
/// change that:
///
/// ```sh
/// RUST_LOG=debug fq '*.txt' jq .
/// RUST_LOG=fq_core::sink=trace fq '*.txt'
/// ```
///
/// When `FQ_LOG_DIR` is set, the same events are also appended to a
/// daily-rolling `fq.log` in that directory.
///
/// # Returns
///
/// The file writer guard, if a file layer was installed. It must be kept
/// alive until the program exits so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - The subscriber cannot be set as global default
pub fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let (writer, guard) = non_blocking(rolling::daily(dir, "fq.log"));
            let layer = fmt::layer()
                .with_writer(writer)
                .event_format(fmt::format().with_ansi(false).with_target(false));
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(fmt::format().compact()),
        )
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
