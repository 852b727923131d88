mod app;
mod cache;
mod commands;
mod config;
mod dataview;
mod directory;
mod event;
mod export;
mod logging;
mod photo;
mod query;
mod session;
mod ui;

use cache::{CacheStorage, MemoryStorage, SqliteStorage};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "staffdir")]
#[command(about = "A terminal dashboard for the employee directory")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/staffdir/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Keep the cache and session in memory only
  #[arg(long)]
  ephemeral: bool,

  /// Directory for log files
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Held until exit so buffered log lines are flushed
  let log_dir = args.log_dir.unwrap_or_else(logging::default_log_dir);
  let _guard = logging::init_logging(&log_dir)?;

  let config = config::Config::load(args.config.as_deref())?;

  let storage: Arc<dyn CacheStorage> = if args.ephemeral {
    Arc::new(MemoryStorage::new())
  } else {
    Arc::new(SqliteStorage::open()?)
  };
  info!(ephemeral = args.ephemeral, "Starting");

  let mut app = app::App::new(config, storage)?;
  app.run().await?;

  Ok(())
}
