//! Error types for `tracker-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("candidate not found: {0}")]
  CandidateNotFound(i64),

  #[error("role not found: {0}")]
  RoleNotFound(i64),

  #[error("application not found: {0}")]
  ApplicationNotFound(i64),

  #[error("unknown grade value: {0:?}")]
  UnknownGrade(String),

  #[error("unknown scheme: {0:?}")]
  UnknownScheme(String),

  #[error("unknown role-change type: {0:?}")]
  UnknownChangeType(String),

  #[error("unknown location tag: {0:?}")]
  UnknownLocationTag(String),

  #[error("unknown survey kind: {0:?}")]
  UnknownSurveyKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
