//! Category statistics
//!
//! Folds monthly buckets into one row per category:
//! - `simple_average`: total spend divided by the category's age in months
//! - `weighted_average`: monthly sums averaged with decay weights, so recent
//!   months dominate
//!
//! The horizon of the decay table spans from the earliest transaction in
//! the whole ledger (active or not) to `now`.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::budget::monthly_budget;
use crate::decay::DecayScheme;
use crate::models::{CategoryStat, Cell, MonthlyBucket, Table, TransactionRecord};
use crate::months::months_between;

/// Leading header columns of the statistics table
pub const STATS_HEADER: [&str; 3] = ["category", "group", "average"];

/// Header of the optional budget column
pub const BUDGET_HEADER: &str = "budgeted";

/// Category → group lookup
///
/// Built once from all records. When records disagree about a category's
/// group, the first one in input order wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryGroups {
    groups: HashMap<String, String>,
}

impl CategoryGroups {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut groups = HashMap::new();
        for record in records {
            groups
                .entry(record.category.clone())
                .or_insert_with(|| record.category_group.clone());
        }
        Self { groups }
    }

    /// Group of `category`, empty when the category was never seen
    pub fn group_of(&self, category: &str) -> &str {
        self.groups.get(category).map(String::as_str).unwrap_or("")
    }
}

/// Months covered by the ledger: distance from the earliest transaction to
/// `now`, plus one. Never less than one.
pub fn horizon(records: &[TransactionRecord], now: NaiveDate) -> usize {
    records
        .iter()
        .map(|r| r.transaction_date)
        .min()
        .map(|earliest| (months_between(now, earliest) + 1).max(1) as usize)
        .unwrap_or(1)
}

/// Weighted mean of `(value, weight)` pairs, exactly 0 when the weights sum
/// to 0
pub fn weighted_mean(samples: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = samples.iter().map(|(_, w)| w).sum();
    if total_weight == 0.0 {
        return 0.0;
    }
    samples.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight
}

/// Builds per-category statistics as of a fixed date
#[derive(Debug, Clone)]
pub struct StatsBuilder {
    now: NaiveDate,
    scheme: DecayScheme,
}

impl StatsBuilder {
    pub fn new(now: NaiveDate, scheme: DecayScheme) -> Self {
        Self { now, scheme }
    }

    pub fn scheme(&self) -> &DecayScheme {
        &self.scheme
    }

    /// One row per category in `buckets`, sorted by category name
    ///
    /// `records` is the full ledger: it sets the decay horizon and the
    /// category groups.
    pub fn build(
        &self,
        records: &[TransactionRecord],
        buckets: &[MonthlyBucket],
    ) -> Vec<CategoryStat> {
        let horizon = horizon(records, self.now);
        let weigher = self.scheme.build(horizon);
        let groups = CategoryGroups::from_records(records);
        debug!(
            "Building stats with {} decay over {} months",
            self.scheme.kind(),
            horizon
        );

        let mut by_category: BTreeMap<&str, Vec<&MonthlyBucket>> = BTreeMap::new();
        for bucket in buckets {
            by_category
                .entry(bucket.category.as_str())
                .or_default()
                .push(bucket);
        }

        by_category
            .into_iter()
            .map(|(category, mut months)| {
                months.sort_by_key(|b| b.month);

                let samples: Vec<(f64, f64)> = months
                    .iter()
                    .map(|b| {
                        let age = months_between(self.now, b.month);
                        (b.amount_sum, weigher.weight(age))
                    })
                    .collect();
                let total: f64 = months.iter().map(|b| b.amount_sum).sum();

                // Buckets are sorted, the first one is the oldest
                let category_age = months
                    .first()
                    .map(|b| months_between(self.now, b.month))
                    .unwrap_or(0);
                let simple_average = if category_age > 0 {
                    Some(total / category_age as f64)
                } else {
                    warn!(
                        "Category {} has no elapsed months, leaving its average blank",
                        category
                    );
                    None
                };

                CategoryStat {
                    category: category.to_string(),
                    group: groups.group_of(category).to_string(),
                    simple_average,
                    weighted_average: weighted_mean(&samples),
                    budgeted: monthly_budget(category),
                }
            })
            .collect()
    }
}

/// Header row plus one row per category
pub fn stats_table(stats: &[CategoryStat], scheme: &DecayScheme, include_budget: bool) -> Table {
    let mut header: Vec<Cell> = STATS_HEADER.iter().map(|&h| Cell::from(h)).collect();
    header.push(Cell::from(scheme.column_label()));
    if include_budget {
        header.push(Cell::from(BUDGET_HEADER));
    }

    let mut table = Vec::with_capacity(stats.len() + 1);
    table.push(header);
    for stat in stats {
        let mut row = vec![
            Cell::text(stat.category.clone()),
            Cell::text(stat.group.clone()),
            Cell::from(stat.simple_average),
            Cell::from(stat.weighted_average),
        ];
        if include_budget {
            row.push(Cell::from(stat.budgeted));
        }
        table.push(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_monthly;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(now: NaiveDate, records: &[TransactionRecord]) -> Vec<CategoryStat> {
        StatsBuilder::new(now, DecayScheme::default()).build(records, &aggregate_monthly(records))
    }

    #[test]
    fn test_groceries_scenario() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2024, 1, 10), "Groceries", "Food", 100.0, true),
            TransactionRecord::new(date(2024, 5, 20), "Groceries", "Food", 200.0, true),
        ];
        let stats = build(now, &records);
        assert_eq!(
            stats,
            vec![CategoryStat {
                category: "Groceries".into(),
                group: "Food".into(),
                simple_average: Some(60.0),
                weighted_average: 150.0,
                budgeted: 0.0,
            }]
        );
    }

    #[test]
    fn test_sorted_by_category() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2024, 1, 1), "rent", "Housing", 1.0, true),
            TransactionRecord::new(date(2024, 1, 1), "Zoo", "Fun", 1.0, true),
            TransactionRecord::new(date(2024, 1, 1), "Books", "Fun", 1.0, true),
            TransactionRecord::new(date(2024, 1, 1), "Fuel", "Transport", 1.0, true),
        ];
        let names: Vec<String> = build(now, &records)
            .into_iter()
            .map(|s| s.category)
            .collect();
        // Native string order: uppercase before lowercase
        assert_eq!(names, vec!["Books", "Fuel", "Zoo", "rent"]);
    }

    #[test]
    fn test_equal_weights_reduce_to_mean() {
        let samples = [(10.0, 1.0), (20.0, 1.0), (60.0, 1.0)];
        assert_eq!(weighted_mean(&samples), 30.0);
    }

    #[test]
    fn test_zero_total_weight_is_zero() {
        assert_eq!(weighted_mean(&[(10.0, 0.0), (20.0, 0.0)]), 0.0);
        assert_eq!(weighted_mean(&[]), 0.0);
    }

    #[test]
    fn test_zero_weight_with_quadratic_decay() {
        // Every bucket older than the quadratic scale weighs 0
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2022, 1, 1), "Old", "Misc", -50.0, true),
            TransactionRecord::new(date(2022, 3, 1), "Old", "Misc", -70.0, true),
        ];
        let scheme = DecayScheme::Quadratic { scale: 13.0 };
        let stats = StatsBuilder::new(now, scheme).build(&records, &aggregate_monthly(&records));
        assert_eq!(stats[0].weighted_average, 0.0);
        assert!(stats[0].simple_average.is_some());
    }

    #[test]
    fn test_current_month_only_category_has_no_average() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2024, 1, 1), "Rent", "Housing", -900.0, true),
            TransactionRecord::new(date(2024, 6, 2), "New", "Misc", -25.0, true),
        ];
        let stats = build(now, &records);
        let new = stats.iter().find(|s| s.category == "New").unwrap();
        assert_eq!(new.simple_average, None);
        assert_eq!(new.weighted_average, -25.0);
    }

    #[test]
    fn test_future_dated_bucket_weighs_like_current() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2024, 5, 1), "Rent", "Housing", -900.0, true),
            TransactionRecord::new(date(2024, 8, 1), "Rent", "Housing", -900.0, true),
        ];
        let stats = build(now, &records);
        assert_eq!(stats[0].weighted_average, -900.0);
        assert_eq!(stats[0].simple_average, Some(-1800.0));
    }

    #[test]
    fn test_horizon_uses_unfiltered_records() {
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2020, 6, 1), "Gone", "Misc", -1.0, false),
            TransactionRecord::new(date(2024, 1, 1), "Rent", "Housing", -900.0, true),
        ];
        assert_eq!(horizon(&records, now), 49);
        assert_eq!(horizon(&[], now), 1);
    }

    #[test]
    fn test_old_months_weigh_less() {
        // Horizon of 30 months: the 29-month-old bucket weighs 0.01
        let now = date(2024, 6, 15);
        let records = vec![
            TransactionRecord::new(date(2022, 1, 1), "Fuel", "Transport", -1000.0, true),
            TransactionRecord::new(date(2024, 5, 1), "Fuel", "Transport", -100.0, true),
        ];
        let stats = build(now, &records);
        let expected = (-1000.0 * 0.01 + -100.0) / 1.01;
        assert!((stats[0].weighted_average - expected).abs() < 1e-9);
    }

    #[test]
    fn test_group_first_occurrence_wins() {
        let records = vec![
            TransactionRecord::new(date(2024, 1, 1), "Coffee", "Food", -3.0, false),
            TransactionRecord::new(date(2024, 2, 1), "Coffee", "Treats", -3.0, true),
        ];
        let groups = CategoryGroups::from_records(&records);
        assert_eq!(groups.group_of("Coffee"), "Food");
        assert_eq!(groups.group_of("Unknown"), "");

        let stats = build(date(2024, 6, 1), &records);
        assert_eq!(stats[0].group, "Food");
    }

    #[test]
    fn test_budget_from_category_name() {
        let now = date(2024, 6, 15);
        let records = vec![TransactionRecord::new(
            date(2024, 3, 1),
            "Insurance 600/y",
            "Car",
            -600.0,
            true,
        )];
        assert_eq!(build(now, &records)[0].budgeted, 50.0);
    }

    #[test]
    fn test_stats_table_layout() {
        let stats = vec![
            CategoryStat {
                category: "Groceries".into(),
                group: "Food".into(),
                simple_average: Some(60.0),
                weighted_average: 150.0,
                budgeted: 0.0,
            },
            CategoryStat {
                category: "New".into(),
                group: "Misc".into(),
                simple_average: None,
                weighted_average: -25.0,
                budgeted: 10.0,
            },
        ];
        let table = stats_table(&stats, &DecayScheme::default(), false);
        assert_eq!(
            table[0],
            vec![
                Cell::text("category"),
                Cell::text("group"),
                Cell::text("average"),
                Cell::text("linear_decay"),
            ]
        );
        assert_eq!(
            table[1],
            vec![
                Cell::text("Groceries"),
                Cell::text("Food"),
                Cell::Number(60.0),
                Cell::Number(150.0),
            ]
        );
        assert_eq!(table[2][2], Cell::Blank);

        let with_budget = stats_table(&stats, &DecayScheme::Exponential { scale: 13.0 }, true);
        assert_eq!(with_budget[0][3], Cell::text("exponential_decay"));
        assert_eq!(with_budget[0][4], Cell::text("budgeted"));
        assert_eq!(with_budget[2][4], Cell::Number(10.0));
    }
}
