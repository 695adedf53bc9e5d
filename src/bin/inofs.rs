//! inofs binary: interactive shell over the in-memory filesystem.

use anyhow::Result;
use clap::Parser;
use inofs::config::FsConfig;
use inofs::logging::init_logging;
use inofs::session::FsSession;
use inofs::shell::Shell;
use inofs::store::persistence::SnapshotFile;
use inofs::store::NodeStore;
use std::path::PathBuf;
use tracing::info;

/// inofs - in-memory inode filesystem simulator
#[derive(Parser)]
#[command(name = "inofs")]
#[command(about = "In-memory inode filesystem simulator with snapshot persistence")]
struct Cli {
    /// Snapshot file path (overrides config)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FsConfig::load_from(path)?,
        None => FsConfig::load()?,
    };
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_path = snapshot;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging)?;

    let snapshot = SnapshotFile::new(&config.snapshot_path);
    let store = match snapshot.load() {
        Ok(store) => store,
        Err(e) => {
            // A corrupt or unreadable snapshot is reported, not fatal; the
            // session starts over with an empty tree.
            eprintln!("warning: {e}; starting with an empty filesystem");
            NodeStore::new()
        }
    };
    info!(entries = store.len(), "filesystem loaded");

    let mut shell = Shell::new(FsSession::with_store(store), snapshot)
        .with_history_limit(config.history_limit);
    shell.run()?;
    Ok(())
}
