//! Cadence normalization for lump-sum payments
//!
//! A yearly insurance premium paid last month would dominate the recent
//! months of a category. Tagging the transaction's notes with
//! `#assume-cadence:12m` (or `#assumed-interval:1y`) spreads it out: while
//! the payment is younger than its cadence, only the share for the months
//! elapsed so far counts.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::models::TransactionRecord;
use crate::months::months_between;

fn cadence_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"#assumed?-(?:cadence|interval):(?P<amount>\d+)(?P<unit>[my])")
            .expect("valid regex")
    })
}

/// Cadence in months declared in a transaction note
pub fn cadence_months(notes: &str) -> Option<u32> {
    let caps = cadence_marker().captures(notes)?;
    let amount: u32 = caps["amount"].parse().ok()?;
    match &caps["unit"] {
        "y" => amount.checked_mul(12),
        _ => Some(amount),
    }
}

/// Normalize one transaction against `now`
pub fn normalize(record: &TransactionRecord, now: NaiveDate) -> TransactionRecord {
    let Some(cadence) = record.notes.as_deref().and_then(cadence_months) else {
        return record.clone();
    };
    if cadence == 0 {
        return record.clone();
    }

    let age = months_between(now, record.transaction_date).max(1);
    if age as u32 >= cadence {
        return record.clone();
    }

    let amount = record.amount / cadence as f64 * age as f64;
    debug!(
        "Normalized {} transaction on {} from {:.2} to {:.2} ({}-month cadence)",
        record.category, record.transaction_date, record.amount, amount, cadence
    );
    TransactionRecord {
        amount,
        ..record.clone()
    }
}

/// Normalize every transaction against `now`
pub fn normalize_all(records: &[TransactionRecord], now: NaiveDate) -> Vec<TransactionRecord> {
    records.iter().map(|r| normalize(r, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cadence_months() {
        assert_eq!(cadence_months("#assume-cadence:6m"), Some(6));
        assert_eq!(cadence_months("paid #assumed-interval:1y for car"), Some(12));
        assert_eq!(cadence_months("#assume-interval:3m"), Some(3));
        assert_eq!(cadence_months("#assumed-cadence:2y"), Some(24));
        assert_eq!(cadence_months("no marker"), None);
        assert_eq!(cadence_months("#assume-cadence:6w"), None);
    }

    #[test]
    fn test_oversized_cadence_ignored() {
        assert_eq!(cadence_months("#assume-cadence:400000000y"), None);
        assert_eq!(cadence_months("#assume-cadence:99999999999m"), None);

        let now = date(2024, 6, 15);
        let record = TransactionRecord::new(now, "Insurance", "Car", -1200.0, true)
            .with_notes("#assume-cadence:400000000y");
        assert_eq!(normalize(&record, now).amount, -1200.0);
    }

    #[test]
    fn test_young_lump_sum_is_spread() {
        let now = date(2024, 6, 15);
        let record = TransactionRecord::new(date(2024, 3, 1), "Insurance", "Car", -1200.0, true)
            .with_notes("#assume-cadence:12m");
        let normalized = normalize(&record, now);
        // 3 of 12 months elapsed
        assert_eq!(normalized.amount, -300.0);
        assert_eq!(normalized.category, "Insurance");
    }

    #[test]
    fn test_current_month_counts_as_one() {
        let now = date(2024, 6, 15);
        let record = TransactionRecord::new(date(2024, 6, 2), "Insurance", "Car", -1200.0, true)
            .with_notes("#assumed-interval:1y");
        assert_eq!(normalize(&record, now).amount, -100.0);
    }

    #[test]
    fn test_old_lump_sum_unchanged() {
        let now = date(2024, 6, 15);
        let record = TransactionRecord::new(date(2023, 6, 1), "Insurance", "Car", -1200.0, true)
            .with_notes("#assume-cadence:12m");
        assert_eq!(normalize(&record, now).amount, -1200.0);
    }

    #[test]
    fn test_untagged_unchanged() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2024, 6, 1), "Groceries", "Food", -80.0, true),
            TransactionRecord::new(date(2024, 6, 1), "Groceries", "Food", -20.0, true)
                .with_notes("weekly shop"),
        ];
        assert_eq!(normalize_all(&records, now), records);
    }
}
