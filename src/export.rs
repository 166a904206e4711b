//! Single-sheet tabular export of collected rows.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::*;

/// File name for a query's export: the query without `*` and `"`, plus the run date
pub fn export_file_name(query: &str, date: NaiveDate) -> String {
    let safe: String = query.chars().filter(|c| !matches!(c, '*' | '"')).collect();
    format!("{} - {}.csv", safe, date.format("%Y-%m-%d"))
}

/// Write a header row and one line per row, columns in row field order
pub fn write_rows(path: &Path, rows: &[NormalizedRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read back a previously exported file
pub fn read_rows(path: &Path) -> Result<Vec<NormalizedRow>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(COLUMNS.iter().copied()) {
        return Err(GrantsError::Export(format!(
            "{} does not have the grant export columns",
            path.display()
        )));
    }

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<NormalizedRow>, csv::Error>>()?;
    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
