//! Scheme applications and the post-programme leadership survey.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Applications ────────────────────────────────────────────────────────────

/// A candidate's application to a development-scheme cohort.
///
/// `meta` and `delta` are programme-specific sub-cohort flags; the core treats
/// them as opaque booleans. Applications are ordered by `application_date`
/// descending for "most recent" queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub id:                    i64,
  pub candidate_id:          i64,
  pub scheme_id:             i64,
  pub application_date:      NaiveDate,
  pub scheme_start_date:     NaiveDate,
  pub aspirational_grade_id: Option<i64>,
  pub employee_number:       Option<String>,
  pub successful:            bool,
  pub meta:                  bool,
  pub delta:                 bool,
  pub cohort:                Option<i64>,
  pub withdrawn:             bool,
}

/// Input to [`crate::store::TrackerStore::record_application`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
  pub scheme_id:             i64,
  pub application_date:      NaiveDate,
  pub scheme_start_date:     NaiveDate,
  pub aspirational_grade_id: Option<i64>,
  pub employee_number:       Option<String>,
  pub successful:            bool,
  pub meta:                  bool,
  pub delta:                 bool,
  pub cohort:                Option<i64>,
}

/// Sub-cohort label derived from the `meta`/`delta` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
  Meta,
  Delta,
  MetaAndDelta,
}

impl std::fmt::Display for OfferStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Meta => write!(f, "META"),
      Self::Delta => write!(f, "DELTA"),
      Self::MetaAndDelta => write!(f, "META and DELTA"),
    }
  }
}

impl Application {
  /// The sub-cohort label for this application, or `None` when neither flag
  /// is set.
  pub fn offer_status(&self) -> Option<OfferStatus> {
    match (self.meta, self.delta) {
      (true, true) => Some(OfferStatus::MetaAndDelta),
      (false, true) => Some(OfferStatus::Delta),
      (true, false) => Some(OfferStatus::Meta),
      (false, false) => None,
    }
  }
}

// ─── Leadership surveys ──────────────────────────────────────────────────────

/// Which question set a leadership survey answered.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SurveyKind {
  Fls,
  Sls,
}

/// Kind-specific answers. The variant is the `survey_kind` discriminant
/// stored in the database; the payload is stored as JSON alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SurveyDetail {
  Fls {
    increased_visibility: i64,
  },
  Sls {
    work_differently: i64,
    using_tools:      i64,
    feel_ready:       i64,
  },
}

impl SurveyDetail {
  pub fn kind(&self) -> SurveyKind {
    match self {
      Self::Fls { .. } => SurveyKind::Fls,
      Self::Sls { .. } => SurveyKind::Sls,
    }
  }
}

/// Answers to the shared leadership questions plus the kind-specific payload.
/// Scores are 1–5 Likert responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadershipSurvey {
  pub id:               i64,
  pub application_id:   i64,
  pub confident_leader: i64,
  pub inspiring_leader: i64,
  pub when_new_role:    String,
  pub confidence_built: i64,
  pub detail:           SurveyDetail,
}

/// Input to [`crate::store::TrackerStore::record_leadership_survey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeadershipSurvey {
  pub application_id:   i64,
  pub confident_leader: i64,
  pub inspiring_leader: i64,
  pub when_new_role:    String,
  pub confidence_built: i64,
  pub detail:           SurveyDetail,
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn application(meta: bool, delta: bool) -> Application {
    Application {
      id: 1,
      candidate_id: 1,
      scheme_id: 1,
      application_date: NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
      scheme_start_date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
      aspirational_grade_id: None,
      employee_number: None,
      successful: true,
      meta,
      delta,
      cohort: None,
      withdrawn: false,
    }
  }

  #[test]
  fn offer_status_labels_the_flag_combinations() {
    assert_eq!(application(false, false).offer_status(), None);
    assert_eq!(
      application(true, false).offer_status(),
      Some(OfferStatus::Meta)
    );
    assert_eq!(
      application(false, true).offer_status(),
      Some(OfferStatus::Delta)
    );
    assert_eq!(
      application(true, true).offer_status(),
      Some(OfferStatus::MetaAndDelta)
    );
    assert_eq!(OfferStatus::MetaAndDelta.to_string(), "META and DELTA");
  }

  #[test]
  fn survey_detail_reports_its_kind() {
    assert_eq!(
      SurveyDetail::Fls { increased_visibility: 3 }.kind(),
      SurveyKind::Fls
    );
    assert_eq!(
      SurveyDetail::Sls { work_differently: 1, using_tools: 2, feel_ready: 3 }
        .kind(),
      SurveyKind::Sls
    );
  }
}
