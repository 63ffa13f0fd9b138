//! Header row and sample rows of an uploaded spreadsheet export.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Headers of a sheet plus its first few data rows keyed by header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSample {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl SheetSample {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read the header row and up to `max_rows` data rows of a CSV file.
///
/// Headers are kept as written apart from a leading byte-order mark. When a
/// header repeats, sample rows keep the value of its first column.
pub fn read_sheet(path: &Path, max_rows: usize) -> Result<SheetSample> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header row of {}", path.display()))?
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            if idx == 0 {
                header.trim_start_matches('\u{feff}').to_string()
            } else {
                header.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records().take(max_rows) {
        let record = record.with_context(|| format!("read row of {}", path.display()))?;
        let mut row = BTreeMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.entry(header.clone())
                .or_insert_with(|| value.trim().to_string());
        }
        rows.push(row);
    }
    debug!(
        path = %path.display(),
        headers = headers.len(),
        rows = rows.len(),
        "read sheet sample"
    );
    Ok(SheetSample { headers, rows })
}
