//! Effective configuration command

use anyhow::Result;
use ebb_core::{Config, SchemeKind};

pub fn cmd_config(config: &Config) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    match &config.source {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in defaults"),
    }
    println!("   ─────────────────────────────────────────────");

    println!("   Decay");
    println!("     scheme:          {}", config.decay.scheme);
    match config.decay.scheme {
        SchemeKind::Linear => {
            println!("     decline_start:   {}", config.decay.decline_start);
            println!("     min_weight:      {}", config.decay.min_weight);
        }
        SchemeKind::Exponential | SchemeKind::Quadratic => {
            println!("     scale:           {}", config.decay.scale);
        }
    }

    println!("   Report");
    println!("     normalize_cadence: {}", config.report.normalize_cadence);
    println!("     include_budget:    {}", config.report.include_budget);
    if config.report.earmark_accounts.is_empty() {
        println!("     earmark_accounts:  (none)");
    } else {
        println!(
            "     earmark_accounts:  {}",
            config.report.earmark_accounts.join(", ")
        );
    }

    println!("   Sheets");
    println!(
        "     spreadsheet_id:  {}",
        config.sheets.spreadsheet_id.as_deref().unwrap_or("(not set)")
    );
    println!("     stats_range:     {}", config.sheets.stats_range);
    println!(
        "     balances_range:  {}",
        config.sheets.balances_range.as_deref().unwrap_or("(not set)")
    );
    println!(
        "     earmarks_range:  {}",
        config.sheets.earmarks_range.as_deref().unwrap_or("(not set)")
    );
    match &config.sheets.credentials {
        Some(path) => println!("     credentials:     {}", path.display()),
        None => println!("     credentials:     (not set)"),
    }
    println!("     api_base:        {}", config.sheets.api_base);
    println!("     timeout:         {}s", config.sheets.timeout.as_secs());

    println!("   Publish");
    println!("     max_retries:     {}", config.publish.max_retries);
    println!(
        "     backoff:         {}ms..{}ms",
        config.publish.initial_backoff.as_millis(),
        config.publish.max_backoff.as_millis()
    );
    println!();

    Ok(())
}
