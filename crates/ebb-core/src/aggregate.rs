//! Monthly aggregation of active-category transactions

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{MonthlyBucket, TransactionRecord};
use crate::months::month_start;

/// Sum amounts per (month, category) over active transactions
///
/// Inactive records and records without a category are dropped. Buckets
/// come out ordered by month, then category.
pub fn aggregate_monthly(records: &[TransactionRecord]) -> Vec<MonthlyBucket> {
    let mut sums: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        if !record.active || record.category.is_empty() {
            skipped += 1;
            continue;
        }
        *sums
            .entry((month_start(record.transaction_date), record.category.as_str()))
            .or_insert(0.0) += record.amount;
    }

    debug!(
        "Aggregated {} records into {} monthly buckets ({} skipped)",
        records.len() - skipped,
        sums.len(),
        skipped
    );

    sums.into_iter()
        .map(|((month, category), amount_sum)| MonthlyBucket {
            month,
            category: category.to_string(),
            amount_sum,
        })
        .collect()
}
