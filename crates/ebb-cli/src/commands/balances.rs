//! Account balances command

use std::path::Path;

use anyhow::Result;
use ebb_core::balances::{account_balances, balances_table};
use ebb_core::{AccountBalance, Config};

use super::{load_ledger, publish_table, truncate};
use crate::cli::OutputArgs;

/// Range used when neither --range nor sheets.balances_range is set
pub const DEFAULT_BALANCES_RANGE: &str = "Account Balances";

pub async fn cmd_balances(
    config: &Config,
    file: &Path,
    range: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let records = load_ledger(file)?;
    let balances = account_balances(&records);

    if !output.dry_run {
        print_balances(&balances);
    }

    let range = range
        .or(config.sheets.balances_range.as_deref())
        .unwrap_or(DEFAULT_BALANCES_RANGE);
    publish_table(config, output, range, &balances_table(&balances)).await
}

fn print_balances(balances: &[AccountBalance]) {
    println!();
    println!("🏦 Account Balances");
    println!("   ─────────────────────────────────────────────");

    if balances.is_empty() {
        println!("   No open accounts found.");
        return;
    }

    for balance in balances {
        println!(
            "   {:30} │ {:>12.2}",
            truncate(&balance.name, 30),
            balance.balance
        );
    }
    println!();
}
