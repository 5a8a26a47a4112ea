//! End-to-end report computation
//!
//! `build_report` is pure: it takes the ledger and the reference date and
//! returns every table to publish. Reading the ledger and publishing stay
//! with the caller.

use chrono::NaiveDate;
use tracing::info;

use crate::aggregate::aggregate_monthly;
use crate::balances::{account_balances, balances_table};
use crate::cadence::normalize_all;
use crate::config::Config;
use crate::decay::DecayScheme;
use crate::earmarks::{earmarked_transactions, earmarks_table};
use crate::models::{
    AccountBalance, CategoryStat, EarmarkedTransaction, Table, TransactionRecord,
};
use crate::stats::{stats_table, StatsBuilder};

/// Options for one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub scheme: DecayScheme,
    pub normalize_cadence: bool,
    pub include_budget: bool,
    pub earmark_accounts: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            scheme: DecayScheme::default(),
            normalize_cadence: false,
            include_budget: false,
            earmark_accounts: Vec::new(),
        }
    }
}

impl From<&Config> for ReportOptions {
    fn from(config: &Config) -> Self {
        Self {
            scheme: config.decay.scheme(),
            normalize_cadence: config.report.normalize_cadence,
            include_budget: config.report.include_budget,
            earmark_accounts: config.report.earmark_accounts.clone(),
        }
    }
}

/// Everything computed in one run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub now: NaiveDate,
    pub stats: Vec<CategoryStat>,
    pub balances: Vec<AccountBalance>,
    pub earmarks: Vec<EarmarkedTransaction>,
    stats_table: Table,
    balances_table: Table,
    earmarks_table: Table,
}

impl Report {
    /// Header row followed by one row per category
    pub fn stats_table(&self) -> &Table {
        &self.stats_table
    }

    /// `[account, balance]` rows
    pub fn balances_table(&self) -> &Table {
        &self.balances_table
    }

    /// Header row followed by one row per earmarked transaction
    pub fn earmarks_table(&self) -> &Table {
        &self.earmarks_table
    }
}

/// Compute category statistics, account balances and earmarks as of `now`
pub fn build_report(
    records: &[TransactionRecord],
    now: NaiveDate,
    options: &ReportOptions,
) -> Report {
    let normalized;
    let spending = if options.normalize_cadence {
        normalized = normalize_all(records, now);
        &normalized[..]
    } else {
        records
    };

    let buckets = aggregate_monthly(spending);
    let stats = StatsBuilder::new(now, options.scheme).build(spending, &buckets);
    // Balances and earmarks use the unadjusted amounts
    let balances = account_balances(records);
    let earmarks = earmarked_transactions(records, &options.earmark_accounts);
    info!(
        "Computed stats for {} categories from {} transactions",
        stats.len(),
        records.len()
    );

    Report {
        now,
        stats_table: stats_table(&stats, &options.scheme, options.include_budget),
        balances_table: balances_table(&balances),
        earmarks_table: earmarks_table(&earmarks),
        stats,
        balances,
        earmarks,
    }
}
