//! # CLI Interface
//!
//! Defines the command-line argument structure for `sapphire-node` using
//! `clap` derive. Two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};

use sapphire_protocol::config::BLOCK_CAPACITY;

use crate::logging::{LogFormat, DEFAULT_DIRECTIVE};
use crate::report::OutputFormat;

/// Sapphire block producer.
///
/// Generates synthetic records, packs them into capacity-bounded blocks,
/// seals each block with a Merkle root, and reports the resulting chain.
#[derive(Parser, Debug)]
#[command(
    name = "sapphire-node",
    about = "Sapphire block producer",
    version,
    propagate_version = true
)]
pub struct SapphireNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Sapphire node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate records and chain them into blocks.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of synthetic records to generate.
    #[arg(long, short = 'n', env = "SAPPHIRE_RECORDS", default_value_t = 10_000)]
    pub records: u64,

    /// Byte budget of each block.
    ///
    /// The default holds roughly a gigabyte of payload, so a normal run fits
    /// in one block. Shrink it to watch blocks rotate.
    #[arg(long, short = 'c', env = "SAPPHIRE_CAPACITY", default_value_t = BLOCK_CAPACITY)]
    pub capacity: usize,

    /// Seed for the payload generator. Omit for fresh randomness each run.
    #[arg(long, env = "SAPPHIRE_SEED")]
    pub seed: Option<u64>,

    /// Default tracing filter when `RUST_LOG` is not set.
    #[arg(long, default_value = DEFAULT_DIRECTIVE)]
    pub log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Report format written to stdout.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Append Prometheus metrics in text exposition format to the report.
    #[arg(long)]
    pub metrics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        SapphireNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = SapphireNodeCli::try_parse_from(["sapphire-node", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.capacity, BLOCK_CAPACITY);
        assert_eq!(args.log_level, DEFAULT_DIRECTIVE);
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(args.log_format, LogFormat::Pretty);
        assert!(!args.metrics);
    }

    #[test]
    fn run_overrides() {
        let cli = SapphireNodeCli::try_parse_from([
            "sapphire-node",
            "run",
            "--records",
            "25",
            "--capacity",
            "4096",
            "--seed",
            "7",
            "--output",
            "json",
            "--log-format",
            "json",
            "--metrics",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.records, 25);
        assert_eq!(args.capacity, 4096);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(args.metrics);
    }
}
