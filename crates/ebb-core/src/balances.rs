//! Account balances
//!
//! Balance of an account = sum of all its transaction amounts. Closed
//! accounts and rows without an account name are left out.

use std::collections::HashMap;

use crate::models::{AccountBalance, Cell, Table, TransactionRecord};

/// Balances of open accounts, sorted by name with the leading `[` ignored
///
/// Bank prefixes like `[Santander] Savings` sort by their bank name.
pub fn account_balances(records: &[TransactionRecord]) -> Vec<AccountBalance> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        let Some(name) = record.account_name.as_deref() else {
            continue;
        };
        if record.account_closed {
            continue;
        }
        *totals.entry(name).or_insert(0.0) += record.amount;
    }

    let mut balances: Vec<AccountBalance> = totals
        .into_iter()
        .map(|(name, balance)| AccountBalance {
            name: name.to_string(),
            balance,
        })
        .collect();
    balances.sort_by(|a, b| {
        sort_key(&a.name)
            .cmp(&sort_key(&b.name))
            .then_with(|| a.name.cmp(&b.name))
    });
    balances
}

/// Name with its first `[` removed
fn sort_key(name: &str) -> String {
    name.replacen('[', "", 1)
}

/// `[name, balance]` rows, no header
pub fn balances_table(balances: &[AccountBalance]) -> Table {
    balances
        .iter()
        .map(|b| vec![Cell::text(b.name.clone()), Cell::from(b.balance)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(account: &str, closed: bool, amount: f64) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TransactionRecord::new(date, "Misc", "Other", amount, true).with_account(account, closed)
    }

    #[test]
    fn test_sums_per_account() {
        let records = vec![
            tx("Checking", false, 1000.0),
            tx("Checking", false, -250.0),
            tx("Savings", false, 500.0),
        ];
        let balances = account_balances(&records);
        assert_eq!(
            balances,
            vec![
                AccountBalance {
                    name: "Checking".into(),
                    balance: 750.0
                },
                AccountBalance {
                    name: "Savings".into(),
                    balance: 500.0
                },
            ]
        );
    }

    #[test]
    fn test_closed_and_unnamed_skipped() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = vec![
            tx("Old Card", true, -40.0),
            TransactionRecord::new(date, "Misc", "Other", 99.0, true),
            tx("Checking", false, 10.0),
        ];
        let balances = account_balances(&records);
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].name, "Checking");
    }

    #[test]
    fn test_sorting_ignores_brackets() {
        let records = vec![
            tx("[Santander] Savings", false, 1.0),
            tx("Cash", false, 1.0),
            tx("[Danske] Future", false, 1.0),
        ];
        let names: Vec<String> = account_balances(&records)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Cash", "[Danske] Future", "[Santander] Savings"]);
    }

    #[test]
    fn test_sorting_only_drops_first_bracket() {
        let records = vec![
            tx("[REV][EUR] Savings", false, 1.0),
            tx("REV] Savings", false, 1.0),
            tx("[REV] Savings", false, 1.0),
            tx("REV][EUR] Cash", false, 1.0),
        ];
        let names: Vec<String> = account_balances(&records)
            .into_iter()
            .map(|b| b.name)
            .collect();
        // "REV][EUR] Savings" and "REV][EUR] Cash" keep their inner bracket;
        // "[REV] Savings" ties with "REV] Savings" and falls back to the raw name
        assert_eq!(
            names,
            vec![
                "REV] Savings",
                "[REV] Savings",
                "REV][EUR] Cash",
                "[REV][EUR] Savings",
            ]
        );
    }

    #[test]
    fn test_balances_table() {
        let table = balances_table(&[AccountBalance {
            name: "Checking".into(),
            balance: 12.5,
        }]);
        assert_eq!(table, vec![vec![Cell::text("Checking"), Cell::Number(12.5)]]);
    }
}
