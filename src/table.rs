// 📁 Table I/O - one CSV file per entity per year, grouped by domain
//
// <data_dir>/airline_data/{entity}_{year}.csv
// <data_dir>/banking_data/{entity}_{year}.csv
// <data_dir>/insurance_data/{entity}.csv

use crate::error::GenError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Airline,
    Banking,
    Insurance,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Airline => "airline",
            Domain::Banking => "banking",
            Domain::Insurance => "insurance",
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Domain::Airline => "airline_data",
            Domain::Banking => "banking_data",
            Domain::Insurance => "insurance_data",
        }
    }

    pub fn parse(s: &str) -> Option<Domain> {
        match s {
            "airline" => Some(Domain::Airline),
            "banking" => Some(Domain::Banking),
            "insurance" => Some(Domain::Insurance),
            _ => None,
        }
    }
}

// ============================================================================
// DATA LAYOUT
// ============================================================================

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        self.root.join(domain.dir_name())
    }

    /// `{entity}_{year}.csv`, or `{entity}.csv` when the table is not yearly
    pub fn path(&self, domain: Domain, entity: &str, year: Option<i32>) -> PathBuf {
        let file = match year {
            Some(year) => format!("{}_{}.csv", entity, year),
            None => format!("{}.csv", entity),
        };
        self.domain_dir(domain).join(file)
    }

    /// Monthly split of the banking transaction table
    pub fn monthly_path(&self, year: i32, month: u32) -> PathBuf {
        self.domain_dir(Domain::Banking)
            .join("transactions_by_year")
            .join(format!("transactions_{}_{:02}.csv", year, month))
    }
}

// ============================================================================
// READ / WRITE
// ============================================================================

/// Write rows with a header line, creating parent directories. Returns the row count.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    wtr.flush()?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "table written");
    Ok(rows.len())
}

/// Read a required table. A missing file is `GenError::MissingInput`.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(GenError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: T = result
            .with_context(|| format!("Failed to parse {} row {}", path.display(), line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Read an optional table. A missing file logs a warning and yields no rows.
pub fn read_or_empty<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match read_table(path) {
        Ok(rows) => Ok(rows),
        Err(err) => match err.downcast_ref::<GenError>() {
            Some(GenError::MissingInput { path }) => {
                tracing::warn!(path = %path.display(), "optional input missing, continuing with empty table");
                Ok(Vec::new())
            }
            _ => Err(err),
        },
    }
}

/// Unique scratch directory under the system temp dir
pub fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("synthetic-ledgers-{}-{}", label, uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: String,
        amount: f64,
        note: Option<String>,
    }

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/tmp/data");
        assert_eq!(
            layout.path(Domain::Banking, "customers", Some(2020)),
            PathBuf::from("/tmp/data/banking_data/customers_2020.csv")
        );
        assert_eq!(
            layout.path(Domain::Insurance, "claims", None),
            PathBuf::from("/tmp/data/insurance_data/claims.csv")
        );
        assert_eq!(
            layout.monthly_path(2020, 3),
            PathBuf::from("/tmp/data/banking_data/transactions_by_year/transactions_2020_03.csv")
        );
    }

    #[test]
    fn test_write_then_read() {
        let dir = scratch_dir("table");
        let path = dir.join("nested").join("rows_2020.csv");
        let rows = vec![
            Row { id: "A1".to_string(), amount: 10.5, note: None },
            Row { id: "A2".to_string(), amount: -3.0, note: Some("refund".to_string()) },
        ];

        assert_eq!(write_table(&path, &rows).unwrap(), 2);
        let back: Vec<Row> = read_table(&path).unwrap();
        assert_eq!(back, rows);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_required_and_optional() {
        let path = scratch_dir("missing").join("nope.csv");

        let err = read_table::<Row>(&path).unwrap_err();
        assert_matches!(err.downcast_ref::<GenError>(), Some(GenError::MissingInput { .. }));

        let rows: Vec<Row> = read_or_empty(&path).unwrap();
        assert!(rows.is_empty());
    }
}
