use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Registry, fmt::layer as fmt_layer, prelude::*};

/// Logging configuration, enumerated at construction: where the persistent
/// sink lives and the minimum level for both sinks.
pub struct LogOptions {
    pub file: PathBuf,
    pub level: String,
}

/// Install the dual-sink subscriber: a timestamped console layer plus a
/// non-blocking file layer with ANSI escapes disabled. An explicit
/// `RUST_LOG` takes precedence over the configured level.
///
/// The returned guard must be held for the life of the process so buffered
/// file output is flushed on exit.
pub fn init(options: LogOptions) -> anyhow::Result<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    if let Some(parent) = options.file.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file_name = options
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", options.file.display()))?;
    let directory = options
        .file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let file_appender = rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt_layer().with_writer(std::io::stdout);
    let file_layer = fmt_layer().with_writer(non_blocking).with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to init tracing subscriber")?;

    Ok(guard)
}
