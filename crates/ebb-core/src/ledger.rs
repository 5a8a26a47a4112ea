//! CSV ledger reader
//!
//! Reads transaction exports with a header row. Columns are located by name
//! (case-insensitive), so their order does not matter and extra columns are
//! ignored.
//!
//! Required: `transaction date`, `category`, `category group`, `amount`,
//! `category active`.
//! Optional: `account name`, `account closed`, `payee`, `notes`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::TransactionRecord;

const COL_DATE: &str = "transaction date";
const COL_CATEGORY: &str = "category";
const COL_GROUP: &str = "category group";
const COL_AMOUNT: &str = "amount";
const COL_ACTIVE: &str = "category active";
const COL_ACCOUNT: &str = "account name";
const COL_ACCOUNT_CLOSED: &str = "account closed";
const COL_PAYEE: &str = "payee";
const COL_NOTES: &str = "notes";

/// Column positions resolved from the header row
#[derive(Debug)]
struct Columns {
    date: usize,
    category: usize,
    group: usize,
    amount: usize,
    active: usize,
    account: Option<usize>,
    account_closed: Option<usize>,
    payee: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            date: require(COL_DATE)?,
            category: require(COL_CATEGORY)?,
            group: require(COL_GROUP)?,
            amount: require(COL_AMOUNT)?,
            active: require(COL_ACTIVE)?,
            account: find(COL_ACCOUNT),
            account_closed: find(COL_ACCOUNT_CLOSED),
            payee: find(COL_PAYEE),
            notes: find(COL_NOTES),
        })
    }
}

/// Read a ledger file
pub fn read_ledger_file(path: &Path) -> Result<Vec<TransactionRecord>> {
    let file = File::open(path)?;
    let records = read_ledger(file)?;
    info!("Read {} transactions from {}", records.len(), path.display());
    Ok(records)
}

/// Parse ledger CSV data into transaction records
pub fn read_ledger<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = Columns::from_headers(&headers)?;
    let mut records = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // Row 1 is the header
        let row = idx + 2;

        let field = |i: usize, name: &str| {
            record
                .get(i)
                .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
        };
        let optional = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let transaction_date = parse_date(field(cols.date, COL_DATE)?)
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        let amount = parse_amount(field(cols.amount, COL_AMOUNT)?)
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;

        records.push(TransactionRecord {
            transaction_date,
            category: field(cols.category, COL_CATEGORY)?.trim().to_string(),
            category_group: field(cols.group, COL_GROUP)?.trim().to_string(),
            amount,
            active: parse_flag(field(cols.active, COL_ACTIVE)?),
            account_name: optional(cols.account),
            account_closed: cols
                .account_closed
                .and_then(|i| record.get(i))
                .map(parse_flag)
                .unwrap_or(false),
            payee: optional(cols.payee),
            notes: optional(cols.notes),
        });
    }

    debug!("Parsed {} ledger rows", records.len());
    Ok(records)
}

/// `true` in any case is set; everything else is unset
fn parse_flag(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%d.%m.%Y", // 15.01.2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps: 2024-01-15T10:00:00Z, 2024-01-15 10:00:00
    if s.len() > 10 && matches!(s.as_bytes()[10], b'T' | b' ') {
        if let Ok(date) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Ok(date);
        }
    }

    // JavaScript Date strings: Mon Jan 15 2024 00:00:00 GMT+0100 (...)
    let head: Vec<&str> = s.split_whitespace().take(4).collect();
    if head.len() == 4 {
        if let Ok(date) = NaiveDate::parse_from_str(&head.join(" "), "%a %b %d %Y") {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("01/15/2024").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("15.01.2024").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15T23:00:00.000Z").unwrap(), date(2024, 1, 15));
        assert_eq!(
            parse_date("Mon Jan 15 2024 00:00:00 GMT+0100 (Central European Standard Time)")
                .unwrap(),
            date(2024, 1, 15)
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-123.45").unwrap(), -123.45);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.00);
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_read_ledger_required_columns() {
        let csv = r#"transaction date,category,category group,amount,category active
2024-01-15,Groceries,Food,-52.10,true
2024-01-20,Old Gym,Health,-30.00,false"#;

        let records = read_ledger(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction_date, date(2024, 1, 15));
        assert_eq!(records[0].category, "Groceries");
        assert_eq!(records[0].category_group, "Food");
        assert_eq!(records[0].amount, -52.10);
        assert!(records[0].active);
        assert!(!records[1].active);
        assert_eq!(records[0].account_name, None);
        assert_eq!(records[0].payee, None);
        assert_eq!(records[0].notes, None);
    }

    #[test]
    fn test_read_ledger_column_order_and_optionals() {
        let csv = r##"account closed,account off-budget,account name,category active,transaction date,payee,category group,category,amount,notes,transfer id
"false","false","Checking","true","2024-03-02","Landlord","Housing","Rent","-900","#assume-cadence:3m",""
"true","false","Old Card","true","2024-03-05","Shop","Food","Groceries","-20","",""##;

        let records = read_ledger(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "Rent");
        assert_eq!(records[0].amount, -900.0);
        assert_eq!(records[0].account_name.as_deref(), Some("Checking"));
        assert!(!records[0].account_closed);
        assert_eq!(records[0].payee.as_deref(), Some("Landlord"));
        assert_eq!(records[0].notes.as_deref(), Some("#assume-cadence:3m"));
        assert!(records[1].account_closed);
        assert_eq!(records[1].notes, None);
    }

    #[test]
    fn test_read_ledger_missing_column() {
        let csv = "transaction date,category,amount,category active\n2024-01-15,Groceries,-5,true";
        let err = read_ledger(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("category group"));
    }

    #[test]
    fn test_read_ledger_bad_date_names_row() {
        let csv = r#"transaction date,category,category group,amount,category active
2024-01-15,Groceries,Food,-5,true
not-a-date,Groceries,Food,-5,true"#;
        let err = read_ledger(csv.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Row 3"), "{}", msg);
        assert!(msg.contains("not-a-date"), "{}", msg);
    }

    #[test]
    fn test_read_ledger_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        std::fs::write(
            &path,
            "transaction date,category,category group,amount,category active\n2024-02-01,Fuel,Transport,-40,true\n",
        )
        .unwrap();

        let records = read_ledger_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_group, "Transport");
    }
}
