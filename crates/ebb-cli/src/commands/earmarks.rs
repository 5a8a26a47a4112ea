//! Earmarked transactions command

use std::path::Path;

use anyhow::Result;
use ebb_core::earmarks::{earmarked_transactions, earmarks_table};
use ebb_core::{Config, EarmarkedTransaction};
use tracing::warn;

use super::{load_ledger, publish_table, truncate};
use crate::cli::OutputArgs;

/// Range used when neither --range nor sheets.earmarks_range is set
pub const DEFAULT_EARMARKS_RANGE: &str = "Earmarked Transactions";

pub async fn cmd_earmarks(
    config: &Config,
    file: &Path,
    accounts: &[String],
    range: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let accounts = if accounts.is_empty() {
        &config.report.earmark_accounts[..]
    } else {
        accounts
    };
    if accounts.is_empty() {
        warn!("No earmark accounts configured: set report.earmark_accounts or pass --account");
    }

    let records = load_ledger(file)?;
    let earmarks = earmarked_transactions(&records, accounts);

    if !output.dry_run {
        print_earmarks(&earmarks);
    }

    let range = range
        .or(config.sheets.earmarks_range.as_deref())
        .unwrap_or(DEFAULT_EARMARKS_RANGE);
    publish_table(config, output, range, &earmarks_table(&earmarks)).await
}

fn print_earmarks(earmarks: &[EarmarkedTransaction]) {
    println!();
    println!("🏷️  Earmarked Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    if earmarks.is_empty() {
        println!("   No earmarked transactions found.");
        return;
    }

    for earmark in earmarks {
        println!(
            "   {} │ {:25} │ {:>10.2} │ {}",
            earmark.transaction_date,
            truncate(&earmark.account_name, 25),
            earmark.amount,
            earmark.mark
        );
    }
    println!();
}
