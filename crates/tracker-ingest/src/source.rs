//! Tabular source reading.
//!
//! Both extracts arrive as either CSV or XLSX; the format is chosen by file
//! extension. Rows are exposed as header-keyed string maps so the join and
//! reconciliation stages stay format-agnostic.

use std::{collections::HashMap, path::Path};

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::{Error, Result};

/// One row of a tabular source, keyed by (trimmed) header name.
#[derive(Debug, Clone, Default)]
pub struct Row {
  cells: HashMap<String, String>,
}

impl Row {
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      cells: pairs
        .into_iter()
        .map(|(k, v)| (k.into().trim().to_string(), v.into().trim().to_string()))
        .collect(),
    }
  }

  /// The cell under `column`, trimmed; the empty string when the column is
  /// absent or blank.
  pub fn get(&self, column: &str) -> &str {
    self.cells.get(column).map(String::as_str).unwrap_or("")
  }

  /// Whether the cell holds any value at all.
  pub fn has_value(&self, column: &str) -> bool { !self.get(column).is_empty() }
}

/// Read a CSV or XLSX table, dispatching on the file extension.
pub fn read_table(path: &Path) -> Result<Vec<Row>> {
  match path.extension().and_then(|e| e.to_str()) {
    Some("csv") => read_csv(path),
    Some("xlsx") => read_xlsx(path),
    _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
  }
}

fn read_csv(path: &Path) -> Result<Vec<Row>> {
  let mut reader = csv::Reader::from_path(path)?;
  let headers: Vec<String> =
    reader.headers()?.iter().map(str::to_string).collect();

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    rows.push(Row::from_pairs(
      headers.iter().map(String::as_str).zip(record.iter()),
    ));
  }
  tracing::debug!(path = %path.display(), rows = rows.len(), "read csv table");
  Ok(rows)
}

fn read_xlsx(path: &Path) -> Result<Vec<Row>> {
  let mut workbook: Xlsx<_> = open_workbook(path)?;
  let sheet = workbook
    .sheet_names()
    .first()
    .cloned()
    .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))?;
  let range = workbook
    .worksheet_range(&sheet)
    .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))??;
  let rows = rows_from_range(&range);
  tracing::debug!(path = %path.display(), %sheet, rows = rows.len(), "read xlsx table");
  Ok(rows)
}

/// Convert a worksheet range into header-keyed rows. The first row is the
/// header.
pub fn rows_from_range(range: &calamine::Range<DataType>) -> Vec<Row> {
  let mut iter = range.rows();
  let Some(header_cells) = iter.next() else {
    return Vec::new();
  };
  let headers: Vec<String> = header_cells.iter().map(cell_to_string).collect();

  iter
    .map(|cells| {
      Row::from_pairs(
        headers
          .iter()
          .map(String::as_str)
          .zip(cells.iter().map(cell_to_string)),
      )
    })
    .collect()
}

/// Render a spreadsheet cell the way the CSV path would see it. Whole-number
/// floats (how XLSX stores years and cohort numbers) lose their trailing
/// `.0`.
pub(crate) fn cell_to_string(cell: &DataType) -> String {
  match cell {
    DataType::String(s) => s.trim().to_string(),
    DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
    DataType::Float(f) => f.to_string(),
    DataType::Int(i) => i.to_string(),
    DataType::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
    _ => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_and_blank_cells_read_as_empty() {
    let row = Row::from_pairs([("Name", "  Ada  "), ("Blank", "")]);
    assert_eq!(row.get("Name"), "Ada");
    assert_eq!(row.get("Blank"), "");
    assert_eq!(row.get("Nope"), "");
    assert!(row.has_value("Name"));
    assert!(!row.has_value("Blank"));
  }

  #[test]
  fn unknown_extension_is_rejected() {
    let err = read_table(Path::new("roster.parquet")).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
  }
}
