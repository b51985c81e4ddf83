//! SQLite backend for the talent tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-statement writes (role + change
//! event, wizard submissions, ingestion batches) run inside explicit
//! transactions on that connection.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
