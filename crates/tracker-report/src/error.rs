//! Error type for `tracker-report`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown scheme: {0:?}")]
  UnknownScheme(String),

  #[error("no report window for year {0}")]
  InvalidYear(i32),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("storage error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
