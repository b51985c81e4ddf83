//! Error type for `tracker-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tracker_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("candidate not found: {0}")]
  CandidateNotFound(i64),

  #[error("role not found: {0}")]
  RoleNotFound(i64),

  #[error("application not found: {0}")]
  ApplicationNotFound(i64),

  /// An ingestion row referenced a grade value with no row and no fallback.
  #[error("unknown grade value: {0:?}")]
  UnknownGrade(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
