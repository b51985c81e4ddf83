//! Role history — the temporal core of the tracker.
//!
//! A [`Role`] is an immutable snapshot of what a candidate's job was starting
//! on a given date. It is never edited, only superseded by a newer role. Each
//! transition is recorded by a [`RoleChangeEvent`] linking the former role (if
//! any) to the new one; the event chain is what "current role" and
//! promotion-window queries are derived from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An immutable role snapshot.
///
/// Organisation, profession, and location are optional because an ingested
/// "first role" records only the grade the candidate joined the service at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub id:              i64,
  pub candidate_id:    i64,
  pub date_started:    NaiveDate,
  pub title:           String,
  pub organisation_id: Option<i64>,
  pub profession_id:   Option<i64>,
  pub location_id:     Option<i64>,
  pub grade_id:        i64,
  pub change_type_id:  i64,
}

/// Input to [`crate::store::TrackerStore::new_role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
  pub date_started:    NaiveDate,
  pub title:           String,
  pub organisation_id: Option<i64>,
  pub profession_id:   Option<i64>,
  pub location_id:     Option<i64>,
  pub grade_id:        i64,
  pub change_type_id:  i64,
}

/// Records why and when a candidate moved between roles.
///
/// For a given candidate the events are totally ordered by
/// `(change_date, id)`; the latest event's `new_role_id` is by definition the
/// candidate's current role. A candidate's very first role is linked by an
/// event with `former_role_id = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeEvent {
  pub id:             i64,
  pub candidate_id:   i64,
  pub change_date:    NaiveDate,
  pub former_role_id: Option<i64>,
  pub new_role_id:    i64,
  pub change_type_id: i64,
}
