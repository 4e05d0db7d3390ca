//! `slots` CLI: find shared meeting slots from busy-interval data.
//!
//! ## Usage
//!
//! ```sh
//! # Slots where at least one user is free, best first
//! slots find --query query.json --busy busy.json
//!
//! # Slots where every user is free, top 5, staggered every 15 minutes
//! slots find --query query.json --busy busy.json --all --limit 5 --step 15
//!
//! # Read the query from stdin, tune scoring from a file
//! cat query.json | slots find --query - --busy busy.json --config finder.toml
//!
//! # Show one user's merged busy intervals for a range
//! slots merge --busy busy.json --org acme --user alice \
//!   --start 2026-03-16T09:00:00Z --end 2026-03-16T17:00:00Z
//! ```
//!
//! The busy file has the form
//! `{"organizations": {"<org>": {"<user>": [{"start": "...", "end": "..."}]}}}`.

mod config;
mod logging;

use std::collections::BTreeSet;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use slot_engine::{
    find_all_available_slots, find_available_slots, load_busy_windows, InMemoryBusySource, Query,
    TimeInterval,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Find shared meeting slots from busy-interval data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidate meeting slots for a query
    Find {
        /// Query JSON file ("-" reads stdin)
        #[arg(short, long)]
        query: String,
        /// Busy-interval JSON file ("-" reads stdin)
        #[arg(short, long)]
        busy: String,
        /// Only keep slots where every user is free
        #[arg(long)]
        all: bool,
        /// Keep at most N slots after ranking
        #[arg(long)]
        limit: Option<usize>,
        /// TOML file with finder settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minutes between consecutive slot starts (default: meeting length)
        #[arg(long)]
        step: Option<u32>,
        /// Weight for the share of users free
        #[arg(long)]
        availability_weight: Option<f64>,
        /// Weight for preferring earlier slots
        #[arg(long)]
        earliness_weight: Option<f64>,
    },
    /// Print a user's merged busy intervals within a range
    Merge {
        /// Busy-interval JSON file ("-" reads stdin)
        #[arg(short, long)]
        busy: String,
        /// Organization identifier
        #[arg(long)]
        org: String,
        /// User identifier
        #[arg(long)]
        user: String,
        /// Range start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Range end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Find {
            query,
            busy,
            all,
            limit,
            config: config_path,
            step,
            availability_weight,
            earliness_weight,
        } => {
            if query == "-" && busy == "-" {
                anyhow::bail!("--query and --busy cannot both read from stdin");
            }

            let finder_config = config::load(
                config_path.as_deref(),
                config::Overrides {
                    step_minutes: step,
                    availability_weight,
                    earliness_weight,
                },
            )?;

            let query: Query = serde_json::from_str(&read_input(&query)?)
                .context("Failed to parse query JSON")?;
            query.validate().context("Invalid query")?;

            let source = load_source(&busy)?;

            let mut slots = if all {
                find_all_available_slots(&source, &query, &finder_config).await
            } else {
                find_available_slots(&source, &query, &finder_config).await
            }
            .context("Slot search failed")?;

            info!(found = slots.len(), all, "slot search finished");
            if let Some(limit) = limit {
                slots.truncate(limit);
            }

            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Commands::Merge {
            busy,
            org,
            user,
            start,
            end,
        } => {
            let range = TimeInterval::new(start, end).context("Invalid range")?;
            let source = load_source(&busy)?;
            let users = BTreeSet::from([user.clone()]);

            let windows = load_busy_windows(&source, &org, &users, &range)
                .await
                .context("Failed to load busy intervals")?;

            println!("{}", serde_json::to_string_pretty(windows.get(&user))?);
        }
    }

    Ok(())
}

fn load_source(path: &str) -> Result<InMemoryBusySource> {
    let raw = read_input(path)?;
    InMemoryBusySource::from_json(&raw)
        .with_context(|| format!("Failed to parse busy data: {}", path))
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}
