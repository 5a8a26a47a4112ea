//! Earmarked transactions
//!
//! Transfers into savings accounts can say what the money is set aside for
//! with an `#ear:<purpose>` note. This report lists them for a configured
//! set of receiving accounts, newest first.

use crate::models::{Cell, EarmarkedTransaction, Table, TransactionRecord};

/// Header row of the earmarks table
pub const EARMARKS_HEADER: [&str; 5] = [
    "account name",
    "transaction date",
    "payee",
    "amount",
    "ear mark",
];

const EARMARK_MARKER: &str = "ear:";
const EARMARK_TAG: &str = "#ear:";

/// Earmarked transactions into `receiving_accounts`, newest first
///
/// Closed accounts are included.
pub fn earmarked_transactions(
    records: &[TransactionRecord],
    receiving_accounts: &[String],
) -> Vec<EarmarkedTransaction> {
    let mut earmarks: Vec<EarmarkedTransaction> = records
        .iter()
        .filter_map(|record| {
            let account = record.account_name.as_deref()?;
            if !receiving_accounts.iter().any(|a| a == account) {
                return None;
            }
            let notes = record.notes.as_deref()?;
            if !notes.contains(EARMARK_MARKER) {
                return None;
            }
            Some(EarmarkedTransaction {
                account_name: account.to_string(),
                transaction_date: record.transaction_date,
                payee: record.payee.clone(),
                amount: record.amount,
                mark: notes.replacen(EARMARK_TAG, "", 1),
            })
        })
        .collect();
    earmarks.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
    earmarks
}

/// Header row followed by one row per earmarked transaction
pub fn earmarks_table(earmarks: &[EarmarkedTransaction]) -> Table {
    let header = EARMARKS_HEADER.iter().map(|h| Cell::from(*h)).collect();
    let rows = earmarks.iter().map(|e| {
        vec![
            Cell::text(e.account_name.clone()),
            Cell::text(e.transaction_date.format("%Y-%m-%d").to_string()),
            e.payee.clone().map(Cell::Text).unwrap_or(Cell::Blank),
            Cell::from(e.amount),
            Cell::text(e.mark.clone()),
        ]
    });
    std::iter::once(header).chain(rows).collect()
}
