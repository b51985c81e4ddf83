//! Promotion-rate aggregation.

use chrono::NaiveDate;
use serde::Serialize;
use tracker_core::{
  lookup::ReportDimension,
  store::TrackerStore,
};

use crate::{Error, Result};

/// A count with its share of the group, `0` when the group is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupCount {
  pub count: usize,
  pub rate:  f64,
}

/// One report row: a dimension value with its promotion counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionReportRow {
  pub label:       String,
  pub substantive: GroupCount,
  pub temporary:   GroupCount,
  pub total:       usize,
}

/// A generated promotion report, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionReport {
  pub scheme:       String,
  pub year:         i32,
  pub dimension:    ReportDimension,
  pub window_start: NaiveDate,
  pub window_end:   NaiveDate,
  pub rows:         Vec<PromotionReportRow>,
}

fn ratio_or_zero(count: usize, total: usize) -> f64 {
  if total == 0 { 0.0 } else { count as f64 / total as f64 }
}

/// Compute the promotion report for one scheme year, broken down by
/// `dimension`.
///
/// The window runs from 1 March of the report year to 1 March of the
/// following year — promotions within the programme's first three months are
/// not credited to it. A candidate counts toward a group when their current
/// scheme is the requested one and a change event of the exact kind falls in
/// the window. One audit event records the generation.
pub async fn promotion_rate_report<S: TrackerStore>(
  store: &S,
  user: &str,
  scheme_name: &str,
  year: i32,
  dimension: ReportDimension,
) -> Result<PromotionReport> {
  let scheme = store
    .find_scheme_by_name(scheme_name)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::UnknownScheme(scheme_name.to_string()))?;

  let window_start =
    NaiveDate::from_ymd_opt(year, 3, 1).ok_or(Error::InvalidYear(year))?;
  let window_end =
    NaiveDate::from_ymd_opt(year + 1, 3, 1).ok_or(Error::InvalidYear(year))?;

  let values = store
    .list_dimension_values(dimension)
    .await
    .map_err(Error::store)?;

  let mut rows = Vec::with_capacity(values.len());
  for value in values {
    let candidates = store
      .candidates_with(dimension, value.id)
      .await
      .map_err(Error::store)?;
    let total = candidates.len();

    let mut substantive = 0;
    let mut temporary = 0;
    for candidate_id in candidates {
      let on_scheme = store
        .current_scheme(candidate_id)
        .await
        .map_err(Error::store)?
        .is_some_and(|s| s.id == scheme.id);
      if !on_scheme {
        continue;
      }
      if store
        .promoted_between(candidate_id, window_start, Some(window_end), false)
        .await
        .map_err(Error::store)?
      {
        substantive += 1;
      }
      if store
        .promoted_between(candidate_id, window_start, Some(window_end), true)
        .await
        .map_err(Error::store)?
      {
        temporary += 1;
      }
    }

    rows.push(PromotionReportRow {
      label:       value.value,
      substantive: GroupCount {
        count: substantive,
        rate:  ratio_or_zero(substantive, total),
      },
      temporary:   GroupCount {
        count: temporary,
        rate:  ratio_or_zero(temporary, total),
      },
      total,
    });
  }

  let action = format!(
    "Generated a promotions report on {dimension} for {scheme_name} {year} intake"
  );
  store
    .record_audit_event(user, &action)
    .await
    .map_err(Error::store)?;
  tracing::info!(%dimension, scheme = scheme_name, year, "generated promotion report");

  Ok(PromotionReport {
    scheme: scheme.name,
    year,
    dimension,
    window_start,
    window_end,
    rows,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_groups_report_zero_rather_than_dividing() {
    assert_eq!(ratio_or_zero(0, 0), 0.0);
    assert_eq!(ratio_or_zero(1, 4), 0.25);
  }
}
