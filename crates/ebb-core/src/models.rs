//! Domain models for ebb

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// One ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction_date: NaiveDate,
    pub category: String,
    pub category_group: String,
    /// Negative = expense, positive = income/refund
    pub amount: f64,
    /// Whether the transaction's category is currently active
    pub active: bool,
    pub account_name: Option<String>,
    pub account_closed: bool,
    pub payee: Option<String>,
    pub notes: Option<String>,
}

impl TransactionRecord {
    /// Record with only the columns the statistics need
    pub fn new(
        transaction_date: NaiveDate,
        category: impl Into<String>,
        category_group: impl Into<String>,
        amount: f64,
        active: bool,
    ) -> Self {
        Self {
            transaction_date,
            category: category.into(),
            category_group: category_group.into(),
            amount,
            active,
            account_name: None,
            account_closed: false,
            payee: None,
            notes: None,
        }
    }

    pub fn with_account(mut self, name: impl Into<String>, closed: bool) -> Self {
        self.account_name = Some(name.into());
        self.account_closed = closed;
        self
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Sum of one category's amounts within one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// First day of the month
    pub month: NaiveDate,
    pub category: String,
    pub amount_sum: f64,
}

/// Per-category output row
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub group: String,
    /// Total spend divided by the category's age in months.
    /// `None` when the category has no elapsed months yet.
    pub simple_average: Option<f64>,
    /// Decay-weighted mean of the monthly sums
    pub weighted_average: f64,
    /// Monthly budget declared in the category name (0 when none)
    pub budgeted: f64,
}

/// Balance of one open account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub name: String,
    pub balance: f64,
}

/// A transfer into a savings account tagged with what it is set aside for
#[derive(Debug, Clone, PartialEq)]
pub struct EarmarkedTransaction {
    pub account_name: String,
    pub transaction_date: NaiveDate,
    pub payee: Option<String>,
    pub amount: f64,
    /// Note with the `#ear:` tag removed
    pub mark: String,
}

/// A scalar spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::Number).unwrap_or(Self::Blank)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Blank => Ok(()),
        }
    }
}

// Sheets takes strings and numbers; a blank is an empty string
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Blank => serializer.serialize_str(""),
        }
    }
}

/// Row-major table of cells
pub type Table = Vec<Vec<Cell>>;
