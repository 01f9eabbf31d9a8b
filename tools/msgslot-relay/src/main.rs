//! msgslot-relay - drive sender/reader sessions against one slot table
//!
//! Every script line is one client run (open → select → write or read →
//! release). All lines share a single table, the way repeated utility runs
//! share one loaded driver.
//!
//! Usage:
//!   msgslot-relay [--config relay.toml] [--script session.txt]
//!
//! Without `--script` the script is read from stdin.

mod config;
mod script;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use msgslot::SlotTable;

use crate::config::RelayConfig;

#[derive(Parser, Debug)]
#[command(name = "msgslot-relay")]
#[command(version)]
#[command(about = "Run message slot sender/reader sessions against a shared slot table")]
struct Args {
    /// TOML file with a [limits] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script of `send`/`recv` lines (stdin if omitted)
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = relay(Args::parse()) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn relay(args: Args) -> Result<()> {
    let owned;
    let table: &SlotTable = match &args.config {
        Some(path) => {
            let config = RelayConfig::load(path)?;
            owned = SlotTable::with_limits(config.limits);
            &owned
        }
        None => SlotTable::global(),
    };
    log::info!("Limits: {} channels per slot", table.limits().max_channels());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let sessions = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            script::run(table, BufReader::new(file), &mut out)?
        }
        None => script::run(table, io::stdin().lock(), &mut out)?,
    };

    log::info!("Completed {} sessions", sessions);
    Ok(())
}
