//! Error type for `tracker-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::XlsxError),

  #[error("unsupported table format: {0:?}")]
  UnsupportedFormat(PathBuf),

  #[error("workbook has no sheets: {0:?}")]
  EmptyWorkbook(PathBuf),

  #[error("unknown scheme: {0:?}")]
  UnknownScheme(String),

  /// A grade value with no dimension row and no seeded fallback.
  #[error("row {row}: unknown grade value {value:?}")]
  UnknownGrade { row: usize, value: String },

  #[error("role-change type {0:?} is not seeded")]
  UnknownChangeType(String),

  #[error("row {row}: field {field:?} is missing or malformed")]
  InvalidField { row: usize, field: String },

  #[error("storage error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from the store trait.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
