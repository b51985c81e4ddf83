//! JSON/CSV API for the talent tracker.
//!
//! Exposes an axum [`Router`] backed by any [`tracker_core::store::TrackerStore`].
//! This is the contract the multi-step wizard UI drives: it submits complete,
//! already-validated payloads, and every mutation is one atomic store call.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tracker_api::api_router(store.clone()))
//! ```

pub mod applications;
pub mod candidates;
pub mod error;
pub mod reports;
pub mod roles;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracker_core::store::TrackerStore;
use tracker_ingest::ColumnMap;

pub use error::ApiError;

/// Server configuration, loaded from `config.toml` and `TRACKER_`-prefixed
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Audit-log label for actions triggered without a named user.
  pub report_user: String,
  /// Column contracts for the ingestion extracts.
  pub columns:     ColumnMap,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:        "127.0.0.1".into(),
      port:        8080,
      store_path:  PathBuf::from("tracker.db"),
      report_user: "system".into(),
      columns:     ColumnMap::default(),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TrackerStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Candidates
    .route("/candidates/search", get(candidates::search::<S>))
    .route("/candidates/{id}", get(candidates::get_one::<S>))
    .route("/candidates/{id}/name", post(candidates::update_name::<S>))
    .route("/candidates/{id}/email", post(candidates::update_email::<S>))
    // Role history
    .route("/candidates/{id}/roles", post(roles::submit::<S>))
    .route(
      "/candidates/{id}/reachable-grades",
      get(roles::reachable_grades::<S>),
    )
    .route("/grades/eligible", get(roles::eligible::<S>))
    // Applications
    .route("/applications/{id}/defer", post(applications::defer::<S>))
    .route(
      "/applications/{id}/leadership",
      post(applications::record_survey::<S>),
    )
    // Reports
    .route("/reports/promotions", post(reports::promotions::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}
