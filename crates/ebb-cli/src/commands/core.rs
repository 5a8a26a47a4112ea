//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Load the effective configuration
//! - `load_ledger` - Read the ledger CSV
//! - `resolve_now` - Reference date from `--now` or today
//! - `report_options` - Report options from config plus CLI overrides
//! - `build_sink` / `publish_table` - Send a table to its destination

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use ebb_core::ledger::read_ledger_file;
use ebb_core::{
    publish_with_retry, Config, CsvSink, DecayScheme, ReportOptions, ReportSink, SchemeKind,
    SheetsAuth, SheetsSink, Table, TransactionRecord,
};
use tracing::debug;

use crate::cli::OutputArgs;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load(path).context("Failed to load configuration")?;
    match &config.source {
        Some(source) => debug!("Loaded config from {}", source.display()),
        None => debug!("Using built-in default config"),
    }
    Ok(config)
}

pub fn load_ledger(path: &Path) -> Result<Vec<TransactionRecord>> {
    let records = read_ledger_file(path)
        .with_context(|| format!("Failed to read ledger {}", path.display()))?;
    debug!("Read {} transactions from {}", records.len(), path.display());
    Ok(records)
}

/// Parse `--now`, falling back to today's date
pub fn resolve_now(now: Option<&str>) -> Result<NaiveDate> {
    match now {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --now date format (use YYYY-MM-DD)"),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Decay scheme from config, with the kind optionally overridden
pub fn resolve_scheme(config: &Config, scheme: Option<&str>) -> Result<DecayScheme> {
    match scheme {
        Some(s) => {
            let kind: SchemeKind = s.parse().map_err(anyhow::Error::msg)?;
            Ok(DecayScheme::from_kind(
                kind,
                config.decay.decline_start,
                config.decay.min_weight,
                config.decay.scale,
            ))
        }
        None => Ok(config.decay.scheme()),
    }
}

pub fn report_options(
    config: &Config,
    scheme: Option<&str>,
    budget: bool,
    cadence: bool,
) -> Result<ReportOptions> {
    let mut options = ReportOptions::from(config);
    options.scheme = resolve_scheme(config, scheme)?;
    if budget {
        options.include_budget = true;
    }
    if cadence {
        options.normalize_cadence = true;
    }
    Ok(options)
}

/// Pick the sink: stdout for --dry-run, CSV files for --output, else Sheets
pub fn build_sink(config: &Config, output: &OutputArgs) -> Result<Box<dyn ReportSink>> {
    if output.dry_run {
        return Ok(Box::new(CsvSink::stdout()));
    }
    if let Some(ref dir) = output.output {
        return Ok(Box::new(CsvSink::to_dir(dir)));
    }

    let spreadsheet_id = config.sheets.spreadsheet_id.as_deref().context(
        "No spreadsheet configured: set sheets.spreadsheet_id or EBB_SPREADSHEET_ID (or use --dry-run)",
    )?;
    let auth = SheetsAuth::resolve(config.sheets.credentials.as_deref())
        .context("Failed to load Google Sheets credentials")?;
    let sink = SheetsSink::new(
        &config.sheets.api_base,
        spreadsheet_id,
        auth,
        config.sheets.timeout,
    )
    .context("Failed to create Google Sheets client")?;
    Ok(Box::new(sink))
}

/// Publish `table` to `range`, retrying per the configured policy
pub async fn publish_table(
    config: &Config,
    output: &OutputArgs,
    range: &str,
    table: &Table,
) -> Result<()> {
    let sink = build_sink(config, output)?;
    publish_with_retry(sink.as_ref(), range, table, &config.publish)
        .await
        .with_context(|| format!("Failed to publish {} to {}", range, sink.name()))?;

    if let Some(ref dir) = output.output {
        if let Some(path) = CsvSink::to_dir(dir).path_for(range) {
            println!("✅ Wrote {} rows to {}", table.len(), path.display());
        }
    } else if !output.dry_run {
        println!("✅ Published {} rows to '{}'", table.len(), range);
    }
    Ok(())
}
