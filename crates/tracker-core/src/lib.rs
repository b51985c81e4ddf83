//! Core types and trait definitions for the talent tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod application;
pub mod audit;
pub mod candidate;
pub mod error;
pub mod lookup;
pub mod role;
pub mod seniority;
pub mod store;

pub use error::{Error, Result};
