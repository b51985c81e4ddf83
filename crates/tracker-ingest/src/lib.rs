//! Bulk ingestion for the talent tracker.
//!
//! Joins an intake roster with an application-outcomes extract (CSV or XLSX),
//! reconciles each successful row against the lookup dimensions, and persists
//! the resulting candidates — with their initial two-role history and
//! application — in one batch transaction. A redaction strategy can be
//! swapped in to anonymise personal fields while preserving the statistical
//! shape of the protected characteristics.

pub mod columns;
pub mod error;
pub mod join;
pub mod row;
pub mod seed;
pub mod source;
pub mod upload;

pub use columns::ColumnMap;
pub use error::{Error, Result};
pub use upload::{Upload, UploadConfig};
