//! Binary crate for the `nowcast` terminal weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The ratatui dashboard and one-shot text output

use anyhow::Context;
use clap::Parser;
use std::{fs::OpenOptions, sync::Mutex};
use tracing_subscriber::EnvFilter;

use nowcast_core::Config;

mod cli;
mod screen;
mod text;
mod tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(&cmd)?;
    cmd.run().await
}

/// The dashboard owns the terminal, so it logs to a file; everything else
/// logs to stderr.
fn init_logging(cmd: &cli::Cli) -> anyhow::Result<()> {
    let filter = if cmd.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if cmd.is_dashboard() {
        let path = Config::log_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log dir: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
