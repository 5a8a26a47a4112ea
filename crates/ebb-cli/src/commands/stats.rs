//! Category statistics command

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use ebb_core::{build_report, Config, Report, ReportOptions};

use super::{load_ledger, publish_table, truncate};
use crate::cli::OutputArgs;

pub async fn cmd_stats(
    config: &Config,
    file: &Path,
    now: NaiveDate,
    options: &ReportOptions,
    range: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let records = load_ledger(file)?;
    let report = build_report(&records, now, options);

    // With --dry-run stdout carries the CSV only
    if !output.dry_run {
        print_stats(&report, options);
    }

    let range = range.unwrap_or(&config.sheets.stats_range);
    publish_table(config, output, range, report.stats_table()).await
}

fn print_stats(report: &Report, options: &ReportOptions) {
    println!();
    println!("📊 Category Stats");
    println!(
        "   As of {} ({})",
        report.now,
        options.scheme.column_label()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.stats.is_empty() {
        println!("   No active spending found.");
        return;
    }

    println!(
        "   {:25} │ {:15} │ {:>10} │ {:>10}",
        "Category", "Group", "Average", "Weighted"
    );
    println!("   ──────────────────────────┼─────────────────┼────────────┼───────────");

    for stat in &report.stats {
        let average = stat
            .simple_average
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        print!(
            "   {:25} │ {:15} │ {:>10} │ {:>10.2}",
            truncate(&stat.category, 25),
            truncate(&stat.group, 15),
            average,
            stat.weighted_average
        );
        if options.include_budget {
            print!(" │ {:>8.2}", stat.budgeted);
        }
        println!();
    }
    println!();
}
