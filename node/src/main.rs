// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sapphire Block Producer
//!
//! Entry point for the `sapphire-node` binary. Parses CLI arguments,
//! initializes logging and metrics, then drives the block pipeline:
//!
//! ```text
//!   generate record ──► encode into leaf ──► chain.append
//!                                               │
//!                                 tip full? ────┤
//!                                               ▼
//!                              build tip, open chained block, retry
//! ```
//!
//! The binary supports two subcommands:
//!
//! - `run`     - generate records and pack them into blocks
//! - `version` - print build version information

mod cli;
mod logging;
mod metrics;
mod payload;
mod producer;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sapphire_protocol::config::BlockConfig;
use sapphire_protocol::storage::Chain;

use cli::{Commands, SapphireNodeCli};
use metrics::NodeMetrics;
use report::RunReport;

fn main() -> Result<()> {
    let cli = SapphireNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_producer(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Generates `args.records` synthetic records and packs them into a chain
/// of blocks. See [`producer::produce`] for the linking rules.
fn run_producer(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(&args.log_level, args.log_format);

    let config = BlockConfig::with_capacity(args.capacity);
    config
        .validate()
        .with_context(|| format!("invalid block capacity: {}", args.capacity))?;

    tracing::info!(
        records = args.records,
        capacity = config.capacity,
        seed = ?args.seed,
        "starting sapphire-node"
    );

    // --- Metrics ---
    let node_metrics = NodeMetrics::new().context("failed to register metrics")?;

    // --- Payload source ---
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // --- Chain ---
    let mut chain = Chain::with_config(config).context("failed to create root block")?;
    node_metrics.chain_length.set(chain.len() as i64);

    let started_at = Utc::now();
    let stats = producer::produce(&mut chain, args.records, &node_metrics, || {
        payload::generate(&mut rng)
    })?;

    // --- Seal the tip ---
    producer::seal_tip(&chain, &node_metrics)?;

    let report = RunReport::from_chain(&chain, started_at, args.records, stats.rejected);
    tracing::info!(
        blocks = report.blocks.len(),
        appended = stats.appended,
        rejected = stats.rejected,
        elapsed_ms = report.elapsed_ms,
        "run complete"
    );

    let rendered = report
        .render(args.output)
        .context("failed to render report")?;
    println!("{}", rendered);

    if args.metrics {
        let exposition = node_metrics.encode().context("failed to encode metrics")?;
        print!("{}", exposition);
    }

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("sapphire-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", sapphire_protocol::config::PROTOCOL_VERSION);
    println!("hash          {}", sapphire_protocol::config::PRIMARY_HASH_FUNCTION);
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
