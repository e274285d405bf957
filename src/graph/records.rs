//! Identity rows read from the bank-data CSV

use crate::error::{AppError, AppResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One CSV row: a person and the phone and email they used.
///
/// Extra CSV columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Email")]
    pub email: String,
}

impl PersonRecord {
    pub fn new(name: &str, phone_number: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            email: email.to_string(),
        }
    }
}

/// Read at most `limit` rows from the CSV at `path`, in file order
pub fn load_csv<P: AsRef<Path>>(path: P, limit: usize) -> AppResult<Vec<PersonRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::DataFileMissing(path.to_path_buf()));
    }

    info!(path = %path.display(), "Loading data");

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let records = reader
        .deserialize::<PersonRecord>()
        .take(limit)
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Malformed row {} in {:?}", i + 1, path)))
        .collect::<anyhow::Result<Vec<PersonRecord>>>()?;

    info!(records = records.len(), limit = limit, "Data loaded successfully");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_rows_and_ignores_extra_columns() {
        let file = csv_file(
            "Name,Phone Number,Email,Account Balance\n\
             Alice,555-0100,a@x.com,120.5\n\
             Bob,555-0200,b@x.com,88\n",
        );
        let records = load_csv(file.path(), 5000).unwrap();
        assert_eq!(
            records,
            vec![
                PersonRecord::new("Alice", "555-0100", "a@x.com"),
                PersonRecord::new("Bob", "555-0200", "b@x.com"),
            ]
        );
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let mut contents = String::from("Name,Phone Number,Email\n");
        for i in 0..10 {
            contents.push_str(&format!("user{i},555-{i:04},user{i}@x.com\n"));
        }
        let file = csv_file(&contents);
        let records = load_csv(file.path(), 3).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "user0");
        assert_eq!(records[2].name, "user2");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(dir.path().join("synthetic_bank_data.csv"), 5000).unwrap_err();
        assert!(err.is_missing_resource());
        assert!(matches!(err, AppError::DataFileMissing(_)));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = csv_file("Name,Email\nAlice,a@x.com\n");
        let err = load_csv(file.path(), 5000).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
