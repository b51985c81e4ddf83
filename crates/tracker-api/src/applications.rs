//! Handlers for application mutations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/applications/{id}/defer` | Body: [`DeferBody`] |
//! | `POST` | `/applications/{id}/leadership` | Body: [`SurveyBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracker_core::{
  application::{Application, NewLeadershipSurvey, SurveyDetail},
  store::TrackerStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct DeferBody {
  pub new_start_date: NaiveDate,
}

/// `POST /applications/{id}/defer` — move the intake to a later cohort
/// start.
pub async fn defer<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<DeferBody>,
) -> Result<Json<Application>, ApiError>
where
  S: TrackerStore,
{
  let application = store
    .defer_application(id, body.new_start_date)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(application))
}

/// Shared leadership answers plus the scheme-specific payload, tagged by
/// survey kind.
#[derive(Debug, Deserialize)]
pub struct SurveyBody {
  pub confident_leader: i64,
  pub inspiring_leader: i64,
  pub when_new_role:    String,
  pub confidence_built: i64,
  pub detail:           SurveyDetail,
}

/// `POST /applications/{id}/leadership` — returns 201 + the stored survey.
pub async fn record_survey<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<SurveyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore,
{
  let survey = store
    .record_leadership_survey(NewLeadershipSurvey {
      application_id:   id,
      confident_leader: body.confident_leader,
      inspiring_leader: body.inspiring_leader,
      when_new_role:    body.when_new_role,
      confidence_built: body.confidence_built,
      detail:           body.detail,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(survey)))
}
