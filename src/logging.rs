//! File logging. The terminal belongs to the UI, so nothing goes to stdout.

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "staffdir.log";

const DEFAULT_FILTER: &str = "staffdir=info";

/// Default log directory: `$XDG_DATA_HOME/staffdir/logs`, or `./logs`.
pub fn default_log_dir() -> PathBuf {
  dirs::data_dir()
    .map(|d| d.join("staffdir"))
    .unwrap_or_else(|| PathBuf::from("."))
    .join("logs")
}

/// Install a daily-rolling file subscriber.
///
/// `RUST_LOG` overrides the default `staffdir=info` filter. The returned
/// guard flushes buffered lines on drop and must live until exit.
pub fn init_logging(dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir)
    .wrap_err_with(|| format!("Failed to create log directory {}", dir.display()))?;

  let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let subscriber = tracing_subscriber::registry().with(env_filter).with(
    fmt::layer()
      .with_writer(writer)
      .with_ansi(false)
      .with_target(true),
  );

  // Ignore error if a subscriber is already installed
  let _ = subscriber.try_init();

  Ok(guard)
}
