//! Report publishing with pluggable sinks
//!
//! - `ReportSink` trait defines the interface for table destinations
//! - `SheetsSink` overwrites a tab of a Google spreadsheet
//! - `CsvSink` writes the table to a local file or stdout
//!
//! Publishing happens after all statistics are computed. A failed publish
//! leaves the computed report untouched, so the caller can still print or
//! save it.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::Table;

mod csv_file;
mod sheets;

pub use csv_file::CsvSink;
pub use sheets::{ServiceAccountKey, SheetsAuth, SheetsSink, SHEETS_SCOPE};

/// Trait for report destinations
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Human-readable name for this sink
    fn name(&self) -> &str;

    /// Replace the contents of `range` with `table`, starting at its
    /// top-left cell
    async fn write_table(&self, range: &str, table: &Table) -> Result<()>;
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Write `table` to `sink`, retrying transient failures
///
/// Permanent failures (auth, permission, not found) are returned at once.
pub async fn publish_with_retry(
    sink: &dyn ReportSink,
    range: &str,
    table: &Table,
    policy: &RetryPolicy,
) -> Result<()> {
    let mut retry = 0;
    loop {
        match sink.write_table(range, table).await {
            Ok(()) => {
                info!(
                    "Published {} rows to {} ({})",
                    table.len(),
                    range,
                    sink.name()
                );
                return Ok(());
            }
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.backoff(retry);
                warn!(
                    "Publishing to {} failed ({}), retry {}/{} in {:?}",
                    sink.name(),
                    e,
                    retry,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
