//! Candidate — the central record the tracker is about.
//!
//! A candidate owns a role history (see [`crate::role`]) and a set of scheme
//! applications. Everything temporal — current role, current grade, promotion
//! status — is derived from those collections at query time, never stored on
//! the candidate itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A persisted candidate row.
///
/// The tri-state survey answers (`caring_responsibility`,
/// `long_term_health_condition`) use `None` for "prefer not to say".
/// Protected-characteristic references are optional: an ingestion row whose
/// free-text answer matches no dimension value leaves the reference empty
/// rather than substituting a different existing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub id:                         i64,
  pub first_name:                 String,
  pub last_name:                  String,
  /// Unique across candidates.
  pub primary_email:              String,
  /// Also unique when present.
  pub secondary_email:            Option<String>,
  pub joining_date:               NaiveDate,
  pub completed_fast_stream:      bool,
  pub caring_responsibility:      Option<bool>,
  pub long_term_health_condition: Option<bool>,
  pub joining_grade_id:           Option<i64>,
  pub age_range_id:               Option<i64>,
  pub working_pattern_id:         Option<i64>,
  pub belief_id:                  Option<i64>,
  pub sexuality_id:               Option<i64>,
  pub gender_id:                  Option<i64>,
  pub ethnicity_id:               Option<i64>,
  pub main_job_type_id:           Option<i64>,
}

/// Input to [`crate::store::TrackerStore::create_candidate`].
/// The id is always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
  pub first_name:                 String,
  pub last_name:                  String,
  pub primary_email:              String,
  pub secondary_email:            Option<String>,
  pub joining_date:               NaiveDate,
  pub completed_fast_stream:      bool,
  pub caring_responsibility:      Option<bool>,
  pub long_term_health_condition: Option<bool>,
  pub joining_grade_id:           Option<i64>,
  pub age_range_id:               Option<i64>,
  pub working_pattern_id:         Option<i64>,
  pub belief_id:                  Option<i64>,
  pub sexuality_id:               Option<i64>,
  pub gender_id:                  Option<i64>,
  pub ethnicity_id:               Option<i64>,
  pub main_job_type_id:           Option<i64>,
}

/// A single email mutation: which slot, and the new address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailUpdate {
  pub address: String,
  /// `true` targets the primary slot, `false` the secondary.
  pub primary: bool,
}
