//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ebb - Decay-weighted category spending statistics
#[derive(Parser)]
#[command(name = "ebb")]
#[command(about = "Decay-weighted category spending statistics for a personal ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/ebb/config/ebb.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute category statistics and publish them
    Stats {
        /// Ledger CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        now: Option<String>,

        /// Decay scheme: linear, exponential, quadratic (overrides config)
        #[arg(long)]
        scheme: Option<String>,

        /// Append the `budgeted` column parsed from category names
        #[arg(long)]
        budget: bool,

        /// Spread lump sums tagged with #assume-cadence:<N>m over their cadence.
        /// Without it (and with report.normalize_cadence unset) tagged amounts
        /// count in full in the month they were paid.
        #[arg(long)]
        cadence: bool,

        /// Target tab or A1 range (overrides sheets.stats_range)
        #[arg(long)]
        range: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compute account balances and publish them
    Balances {
        /// Ledger CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Target tab or A1 range (overrides sheets.balances_range)
        #[arg(long)]
        range: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List transfers into savings accounts tagged with #ear:<purpose>
    Earmarks {
        /// Ledger CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Receiving account to include (repeatable, overrides report.earmark_accounts)
        #[arg(long = "account")]
        accounts: Vec<String>,

        /// Target tab or A1 range (overrides sheets.earmarks_range)
        #[arg(long)]
        range: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the decay weight table
    Weights {
        /// Number of months to show (1-1200)
        #[arg(long, default_value = "25", value_parser = clap::value_parser!(u32).range(1..=1200))]
        horizon: u32,

        /// Decay scheme: linear, exponential, quadratic (overrides config)
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

/// Where computed tables go
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print tables as CSV instead of publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Write tables as CSV files into this directory instead of publishing
    #[arg(short, long, conflicts_with = "dry_run")]
    pub output: Option<PathBuf>,
}
