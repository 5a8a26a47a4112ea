//! ebb Core Library
//!
//! Decay-weighted category spending statistics for a personal ledger:
//! - CSV ledger reader
//! - Whole-month date distances
//! - Decay weighting schemes (linear, exponential, quadratic)
//! - Monthly aggregation and per-category statistics
//! - Cadence normalization, category budgets, account balances, earmarks
//! - Report sinks (Google Sheets, CSV) with retrying publish

pub mod aggregate;
pub mod balances;
pub mod budget;
pub mod cadence;
pub mod config;
pub mod decay;
pub mod earmarks;
pub mod error;
pub mod ledger;
pub mod models;
pub mod months;
pub mod pipeline;
pub mod publish;
pub mod stats;

/// Test utilities including mock Sheets server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use decay::{DecayScheme, DecayWeight, SchemeKind};
pub use error::{Error, Result};
pub use models::{
    AccountBalance, CategoryStat, Cell, EarmarkedTransaction, MonthlyBucket, Table,
    TransactionRecord,
};
pub use pipeline::{build_report, Report, ReportOptions};
pub use publish::{publish_with_retry, CsvSink, ReportSink, RetryPolicy, SheetsAuth, SheetsSink};
