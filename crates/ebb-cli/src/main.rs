//! ebb CLI - Decay-weighted category spending statistics
//!
//! Usage:
//!   ebb stats --file transactions.csv      Compute and publish category stats
//!   ebb balances --file transactions.csv   Compute and publish account balances
//!   ebb earmarks --file transactions.csv   Publish earmarked savings transfers
//!   ebb weights --horizon 36               Show the decay weight table
//!   ebb config                             Show the effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats {
            file,
            now,
            scheme,
            budget,
            cadence,
            range,
            output,
        } => {
            let now = commands::resolve_now(now.as_deref())?;
            let options = commands::report_options(&config, scheme.as_deref(), budget, cadence)?;
            commands::cmd_stats(&config, &file, now, &options, range.as_deref(), &output).await
        }
        Commands::Balances {
            file,
            range,
            output,
        } => commands::cmd_balances(&config, &file, range.as_deref(), &output).await,
        Commands::Earmarks {
            file,
            accounts,
            range,
            output,
        } => {
            commands::cmd_earmarks(&config, &file, &accounts, range.as_deref(), &output).await
        }
        Commands::Weights { horizon, scheme } => {
            commands::cmd_weights(&config, horizon as usize, scheme.as_deref())
        }
        Commands::Config => commands::cmd_config(&config),
    }
}
