//! `gradebook`: command-line front end for the academic records store.
//!
//! # Usage
//!
//! ```text
//! gradebook groups add "ИВТ-21"
//! gradebook import roster students.csv
//! gradebook grade set 12 4 Н
//! gradebook --json sheet 1 3
//! ```
//!
//! The database location comes from `--store`, then `GRADEBOOK_STORE_PATH`,
//! then `store_path` in the config file, then `education.db`.

mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use gradebook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  commands::{Command, Output},
  config::{CliConfig, expand_tilde},
};

#[derive(Parser, Debug)]
#[command(name = "gradebook", version, about = "Academic records manager")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "gradebook.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the configuration.
  #[arg(long, global = true, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays clean for output and `--json`.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = CliConfig::load(&cli.config)?;
  let store_path = cli
    .store
    .as_deref()
    .map_or(cfg.store_path, expand_tilde);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(path = %store_path.display(), "store ready");

  commands::run(&store, cli.command, Output { json: cli.json }).await
}
