//! Tabular exports of the record store.
//!
//! Writes the current record set to `data.csv` and `data.xlsx` under the
//! export directory, regenerated wholesale on every fetch. The column set is
//! the union of all record keys in first-seen order; records missing a
//! column get an empty cell, and nested values are rendered as their JSON
//! text. Irregular record shapes therefore flatten lossily, which is the
//! intended behavior for these disposable snapshots.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::Writer;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::store::Record;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid file format")]
    InvalidFormat(String),
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write XLSX export: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The two recognized tabular formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    /// Fixed relative file name for this format's export artifact.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "data.csv",
            ExportFormat::Xlsx => "data.xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Xlsx => write!(f, "XLSX"),
        }
    }
}

/// Union of record keys, in the order they are first seen across records.
fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Cell text for one field: empty for absent/null, raw text for strings,
/// JSON text for everything else (numbers, bools, nested values).
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Serializes `records` to the given format under `dir`, overwriting any
/// prior artifact, and returns the written path.
pub fn export_records(
    records: &[Record],
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format.file_name());
    let columns = column_order(records);

    match format {
        ExportFormat::Csv => {
            let mut writer = Writer::from_path(&path)?;
            // Zero-field records are not representable in CSV; an empty
            // store produces an empty file.
            if !columns.is_empty() {
                writer.write_record(&columns)?;
                for record in records {
                    writer.write_record(columns.iter().map(|c| cell_text(record.get(c))))?;
                }
            }
            writer.flush()?;
        }
        ExportFormat::Xlsx => {
            let mut workbook = Workbook::new();
            let sheet = workbook.add_worksheet();
            for (col, name) in columns.iter().enumerate() {
                sheet.write_string(0, col as u16, name)?;
            }
            for (row, record) in records.iter().enumerate() {
                for (col, name) in columns.iter().enumerate() {
                    sheet.write_string(row as u32 + 1, col as u16, cell_text(record.get(name)))?;
                }
            }
            workbook.save(&path)?;
        }
    }

    info!(path = %path.display(), rows = records.len(), "Wrote tabular export");
    Ok(path)
}
