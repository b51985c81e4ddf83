//! Handler for promotion-report downloads.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use chrono::Local;
use serde::Deserialize;
use tracker_core::{lookup::ReportDimension, store::TrackerStore};
use tracker_report::{
  promotion_rate_report,
  render::{promotion_csv, promotion_filename},
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PromotionReportBody {
  pub scheme:    String,
  pub year:      i32,
  pub dimension: ReportDimension,
  /// Label recorded in the audit log; defaults to "system".
  pub user:      Option<String>,
}

/// `POST /reports/promotions` — responds with the rendered CSV as a file
/// download.
pub async fn promotions<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PromotionReportBody>,
) -> Result<Response, ApiError>
where
  S: TrackerStore,
{
  let user = body.user.as_deref().unwrap_or("system");
  let report = promotion_rate_report(
    store.as_ref(),
    user,
    &body.scheme,
    body.year,
    body.dimension,
  )
  .await?;

  let csv = promotion_csv(&report)?;
  let filename = promotion_filename(&report, Local::now().date_naive());

  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename={filename}.csv"),
        ),
      ],
      csv,
    )
      .into_response(),
  )
}
