//! Local CSV sink
//!
//! Writes each range to its own file in a directory (`Category Stats` →
//! `category-stats.csv`), or prints it to stdout for dry runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::WriterBuilder;
use tracing::debug;

use super::ReportSink;
use crate::error::{Error, Result};
use crate::models::Table;

/// CSV report sink
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: Option<PathBuf>,
}

impl CsvSink {
    /// Print tables to stdout
    pub fn stdout() -> Self {
        Self { dir: None }
    }

    /// Write one file per range into `dir`
    pub fn to_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// File that `range` is written to, if writing to a directory
    pub fn path_for(&self, range: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.csv", file_stem(range))))
    }
}

/// Lowercase file stem for a range name, sheet part only
fn file_stem(range: &str) -> String {
    let sheet = range.split('!').next().unwrap_or(range);
    let slug: Vec<String> = sheet
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect();
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.join("-")
    }
}

fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in table {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[async_trait]
impl ReportSink for CsvSink {
    fn name(&self) -> &str {
        if self.dir.is_some() {
            "csv"
        } else {
            "stdout"
        }
    }

    async fn write_table(&self, range: &str, table: &Table) -> Result<()> {
        let data = to_csv(table)?;
        match (&self.dir, self.path_for(range)) {
            (Some(dir), Some(path)) => {
                ensure_dir(dir)?;
                std::fs::write(&path, data)?;
                debug!("Wrote {} rows to {}", table.len(), path.display());
            }
            _ => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "# {}", range)?;
                out.write_all(&data)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Category Stats"), "category-stats");
        assert_eq!(file_stem("'Account Balances'!A2:B"), "account-balances");
        assert_eq!(file_stem("!!"), "report");
    }

    #[test]
    fn test_to_csv_quotes_and_blanks() {
        let table = vec![
            vec![Cell::text("category"), Cell::text("average")],
            vec![Cell::text("Food, Drinks"), Cell::Blank],
            vec![Cell::text("Rent"), Cell::Number(-900.5)],
        ];
        let csv = String::from_utf8(to_csv(&table).unwrap()).unwrap();
        assert_eq!(csv, "category,average\n\"Food, Drinks\",\nRent,-900.5\n");
    }

    #[tokio::test]
    async fn test_writes_file_per_range() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::to_dir(dir.path().join("out"));
        let table = vec![vec![Cell::text("Checking"), Cell::Number(10.0)]];

        sink.write_table("Account Balances", &table).await.unwrap();

        let path = sink.path_for("Account Balances").unwrap();
        assert_eq!(path, dir.path().join("out").join("account-balances.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Checking,10\n");
        assert_eq!(sink.name(), "csv");
    }

    #[test]
    fn test_stdout_sink_has_no_path() {
        let sink = CsvSink::stdout();
        assert_eq!(sink.path_for("Category Stats"), None);
        assert_eq!(sink.name(), "stdout");
    }
}
