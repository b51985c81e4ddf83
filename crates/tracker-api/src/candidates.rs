//! Handlers for `/candidates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/candidates/search` | `?email=` matches either address slot |
//! | `GET`  | `/candidates/{id}` | Career profile with derived current-state |
//! | `POST` | `/candidates/{id}/name` | Body: [`NameBody`] |
//! | `POST` | `/candidates/{id}/email` | Body: [`EmailUpdate`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracker_core::{
  application::Application,
  candidate::{Candidate, EmailUpdate},
  lookup::{Grade, Location},
  role::Role,
  store::TrackerStore,
};

use crate::error::ApiError;

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub email: String,
}

/// `GET /candidates/search?email=...` — the wizard's entry point. A miss is
/// a 404 so the form can redisplay with an inline error.
pub async fn search<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Candidate>, ApiError>
where
  S: TrackerStore,
{
  let candidate = store
    .find_candidate_by_email(&params.email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no candidate for {:?}", params.email))
    })?;
  Ok(Json(candidate))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A candidate with their derived current state — everything the career
/// profile page shows.
#[derive(Debug, Serialize)]
pub struct CandidateProfile {
  pub candidate:               Candidate,
  pub current_role:            Option<Role>,
  pub current_grade:           Option<Grade>,
  pub current_location:        Option<Location>,
  pub most_recent_application: Option<Application>,
  /// META/DELTA label of the most recent application, if either flag is set.
  pub offer_status:            Option<String>,
}

/// `GET /candidates/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<CandidateProfile>, ApiError>
where
  S: TrackerStore,
{
  let candidate = store
    .get_candidate(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {id} not found")))?;

  let current_role = store.current_role(id).await.map_err(ApiError::store)?;
  let current_grade = store.current_grade(id).await.map_err(ApiError::store)?;
  let current_location =
    store.current_location(id).await.map_err(ApiError::store)?;
  let most_recent_application = store
    .most_recent_application(id)
    .await
    .map_err(ApiError::store)?;
  let offer_status = most_recent_application
    .as_ref()
    .and_then(Application::offer_status)
    .map(|status| status.to_string());

  Ok(Json(CandidateProfile {
    candidate,
    current_role,
    current_grade,
    current_location,
    most_recent_application,
    offer_status,
  }))
}

// ─── Mutations ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub first_name: String,
  pub last_name:  String,
}

/// `POST /candidates/{id}/name`
pub async fn update_name<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NameBody>,
) -> Result<Json<Candidate>, ApiError>
where
  S: TrackerStore,
{
  store
    .update_name(id, &body.first_name, &body.last_name)
    .await
    .map_err(ApiError::store)?;
  let candidate = store
    .get_candidate(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {id} not found")))?;
  Ok(Json(candidate))
}

/// `POST /candidates/{id}/email` — body: [`EmailUpdate`]. Uniqueness
/// violations surface as a store error, not a silent overwrite.
pub async fn update_email<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<EmailUpdate>,
) -> Result<Json<Candidate>, ApiError>
where
  S: TrackerStore,
{
  store
    .update_email(id, body)
    .await
    .map_err(ApiError::store)?;
  let candidate = store
    .get_candidate(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("candidate {id} not found")))?;
  Ok(Json(candidate))
}
