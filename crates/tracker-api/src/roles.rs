//! Handlers for role updates and grade reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/candidates/{id}/roles` | Body: [`NewRoleBody`]; atomic with an optional email change |
//! | `GET`  | `/candidates/{id}/reachable-grades` | Promotion targets from the current grade |
//! | `GET`  | `/grades/eligible` | `?scheme=` name-prefix eligibility |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracker_core::{
  candidate::EmailUpdate,
  lookup::Grade,
  role::{NewRole, Role, RoleChangeEvent},
  seniority,
  store::TrackerStore,
};

use crate::error::ApiError;

// ─── Role submission ─────────────────────────────────────────────────────────

/// The wizard's final, fully-validated payload: a complete role change and
/// an optional email change, committed together or not at all.
#[derive(Debug, Deserialize)]
pub struct NewRoleBody {
  pub start_date:      NaiveDate,
  pub title:           String,
  pub organisation_id: Option<i64>,
  pub profession_id:   Option<i64>,
  pub location_id:     Option<i64>,
  pub grade_id:        i64,
  pub change_type_id:  i64,
  pub email:           Option<EmailUpdate>,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdateResponse {
  pub role:  Role,
  pub event: RoleChangeEvent,
}

/// `POST /candidates/{id}/roles` — returns 201 + the stored role and its
/// change event.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewRoleBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  let role = NewRole {
    date_started:    body.start_date,
    title:           body.title,
    organisation_id: body.organisation_id,
    profession_id:   body.profession_id,
    location_id:     body.location_id,
    grade_id:        body.grade_id,
    change_type_id:  body.change_type_id,
  };

  let (role, event) = store
    .submit_role_update(id, role, body.email)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(RoleUpdateResponse { role, event })))
}

// ─── Grade reads ─────────────────────────────────────────────────────────────

/// `GET /candidates/{id}/reachable-grades` — the grades the wizard offers as
/// promotion targets, most senior first.
pub async fn reachable_grades<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Grade>>, ApiError>
where
  S: TrackerStore,
{
  let current = store
    .current_grade(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("candidate {id} has no role history"))
    })?;
  let grades = store.list_grades().await.map_err(ApiError::store)?;
  Ok(Json(seniority::grades_reachable_from(&current, &grades)))
}

#[derive(Debug, Deserialize)]
pub struct EligibleParams {
  pub scheme: String,
}

/// `GET /grades/eligible?scheme=FLS`
pub async fn eligible<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<EligibleParams>,
) -> Result<Json<Vec<Grade>>, ApiError>
where
  S: TrackerStore,
{
  let grades = store.list_grades().await.map_err(ApiError::store)?;
  Ok(Json(seniority::eligible_grades(&params.scheme, &grades)))
}
