//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 (`YYYY-MM-DD`), which sorts correctly as
//! text; audit timestamps as RFC 3339. The leadership-survey payload is
//! stored as compact JSON next to its `survey_kind` discriminant column.

use chrono::{DateTime, NaiveDate, Utc};
use tracker_core::{
  application::{Application, LeadershipSurvey, SurveyDetail},
  audit::AuditEvent,
  candidate::Candidate,
  lookup::LocationTag,
  role::{Role, RoleChangeEvent},
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Location tags ───────────────────────────────────────────────────────────

pub fn encode_location_tag(tag: LocationTag) -> &'static str {
  match tag {
    LocationTag::London => "london",
    LocationTag::Region => "region",
    LocationTag::Overseas => "overseas",
    LocationTag::Devolved => "devolved",
  }
}

pub fn decode_location_tag(s: &str) -> Result<LocationTag> {
  match s {
    "london" => Ok(LocationTag::London),
    "region" => Ok(LocationTag::Region),
    "overseas" => Ok(LocationTag::Overseas),
    "devolved" => Ok(LocationTag::Devolved),
    other => Err(Error::DateParse(format!("unknown location tag: {other:?}"))),
  }
}

// ─── Survey payloads ─────────────────────────────────────────────────────────

pub fn encode_survey_detail(detail: &SurveyDetail) -> Result<String> {
  Ok(serde_json::to_string(detail)?)
}

pub fn decode_survey_detail(s: &str) -> Result<SurveyDetail> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read from a `candidates` row.
pub struct RawCandidate {
  pub id:                         i64,
  pub first_name:                 String,
  pub last_name:                  String,
  pub primary_email:              String,
  pub secondary_email:            Option<String>,
  pub joining_date:               String,
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

impl RawCandidate {
  /// Column list matching the field order above; every candidate SELECT
  /// uses this so `from_row` indices stay correct.
  pub const COLUMNS: &'static str = "id, first_name, last_name, \
     primary_email, secondary_email, joining_date, completed_fast_stream, \
     caring_responsibility, long_term_health_condition, joining_grade_id, \
     age_range_id, working_pattern_id, belief_id, sexuality_id, gender_id, \
     ethnicity_id, main_job_type_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                         row.get(0)?,
      first_name:                 row.get(1)?,
      last_name:                  row.get(2)?,
      primary_email:              row.get(3)?,
      secondary_email:            row.get(4)?,
      joining_date:               row.get(5)?,
      completed_fast_stream:      row.get(6)?,
      caring_responsibility:      row.get(7)?,
      long_term_health_condition: row.get(8)?,
      joining_grade_id:           row.get(9)?,
      age_range_id:               row.get(10)?,
      working_pattern_id:         row.get(11)?,
      belief_id:                  row.get(12)?,
      sexuality_id:               row.get(13)?,
      gender_id:                  row.get(14)?,
      ethnicity_id:               row.get(15)?,
      main_job_type_id:           row.get(16)?,
    })
  }

  pub fn into_candidate(self) -> Result<Candidate> {
    Ok(Candidate {
      id:                         self.id,
      first_name:                 self.first_name,
      last_name:                  self.last_name,
      primary_email:              self.primary_email,
      secondary_email:            self.secondary_email,
      joining_date:               decode_date(&self.joining_date)?,
      completed_fast_stream:      self.completed_fast_stream,
      caring_responsibility:      self.caring_responsibility,
      long_term_health_condition: self.long_term_health_condition,
      joining_grade_id:           self.joining_grade_id,
      age_range_id:               self.age_range_id,
      working_pattern_id:         self.working_pattern_id,
      belief_id:                  self.belief_id,
      sexuality_id:               self.sexuality_id,
      gender_id:                  self.gender_id,
      ethnicity_id:               self.ethnicity_id,
      main_job_type_id:           self.main_job_type_id,
    })
  }
}

/// Raw column values read from a `roles` row.
pub struct RawRole {
  pub id:              i64,
  pub candidate_id:    i64,
  pub date_started:    String,
  pub title:           String,
  pub organisation_id: Option<i64>,
  pub profession_id:   Option<i64>,
  pub location_id:     Option<i64>,
  pub grade_id:        i64,
  pub change_type_id:  i64,
}

impl RawRole {
  pub const COLUMNS: &'static str = "id, candidate_id, date_started, title, \
     organisation_id, profession_id, location_id, grade_id, change_type_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      candidate_id:    row.get(1)?,
      date_started:    row.get(2)?,
      title:           row.get(3)?,
      organisation_id: row.get(4)?,
      profession_id:   row.get(5)?,
      location_id:     row.get(6)?,
      grade_id:        row.get(7)?,
      change_type_id:  row.get(8)?,
    })
  }

  pub fn into_role(self) -> Result<Role> {
    Ok(Role {
      id:              self.id,
      candidate_id:    self.candidate_id,
      date_started:    decode_date(&self.date_started)?,
      title:           self.title,
      organisation_id: self.organisation_id,
      profession_id:   self.profession_id,
      location_id:     self.location_id,
      grade_id:        self.grade_id,
      change_type_id:  self.change_type_id,
    })
  }
}

/// Raw column values read from a `role_change_events` row.
pub struct RawEvent {
  pub id:             i64,
  pub candidate_id:   i64,
  pub change_date:    String,
  pub former_role_id: Option<i64>,
  pub new_role_id:    i64,
  pub change_type_id: i64,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "id, candidate_id, change_date, former_role_id, new_role_id, change_type_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      candidate_id:   row.get(1)?,
      change_date:    row.get(2)?,
      former_role_id: row.get(3)?,
      new_role_id:    row.get(4)?,
      change_type_id: row.get(5)?,
    })
  }

  pub fn into_event(self) -> Result<RoleChangeEvent> {
    Ok(RoleChangeEvent {
      id:             self.id,
      candidate_id:   self.candidate_id,
      change_date:    decode_date(&self.change_date)?,
      former_role_id: self.former_role_id,
      new_role_id:    self.new_role_id,
      change_type_id: self.change_type_id,
    })
  }
}

/// Raw column values read from an `applications` row.
pub struct RawApplication {
  pub id:                    i64,
  pub candidate_id:          i64,
  pub scheme_id:             i64,
  pub application_date:      String,
  pub scheme_start_date:     String,
  pub aspirational_grade_id: Option<i64>,
  pub employee_number:       Option<String>,
  pub successful:            bool,
  pub meta:                  bool,
  pub delta:                 bool,
  pub cohort:                Option<i64>,
  pub withdrawn:             bool,
}

impl RawApplication {
  pub const COLUMNS: &'static str = "id, candidate_id, scheme_id, \
     application_date, scheme_start_date, aspirational_grade_id, \
     employee_number, successful, meta, delta, cohort, withdrawn";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                    row.get(0)?,
      candidate_id:          row.get(1)?,
      scheme_id:             row.get(2)?,
      application_date:      row.get(3)?,
      scheme_start_date:     row.get(4)?,
      aspirational_grade_id: row.get(5)?,
      employee_number:       row.get(6)?,
      successful:            row.get(7)?,
      meta:                  row.get(8)?,
      delta:                 row.get(9)?,
      cohort:                row.get(10)?,
      withdrawn:             row.get(11)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      id:                    self.id,
      candidate_id:          self.candidate_id,
      scheme_id:             self.scheme_id,
      application_date:      decode_date(&self.application_date)?,
      scheme_start_date:     decode_date(&self.scheme_start_date)?,
      aspirational_grade_id: self.aspirational_grade_id,
      employee_number:       self.employee_number,
      successful:            self.successful,
      meta:                  self.meta,
      delta:                 self.delta,
      cohort:                self.cohort,
      withdrawn:             self.withdrawn,
    })
  }
}

/// Raw column values read from a `leadership_surveys` row.
pub struct RawSurvey {
  pub id:               i64,
  pub application_id:   i64,
  pub confident_leader: i64,
  pub inspiring_leader: i64,
  pub when_new_role:    String,
  pub confidence_built: i64,
  pub detail_json:      String,
}

impl RawSurvey {
  pub const COLUMNS: &'static str = "id, application_id, confident_leader, \
     inspiring_leader, when_new_role, confidence_built, detail_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      application_id:   row.get(1)?,
      confident_leader: row.get(2)?,
      inspiring_leader: row.get(3)?,
      when_new_role:    row.get(4)?,
      confidence_built: row.get(5)?,
      detail_json:      row.get(6)?,
    })
  }

  pub fn into_survey(self) -> Result<LeadershipSurvey> {
    Ok(LeadershipSurvey {
      id:               self.id,
      application_id:   self.application_id,
      confident_leader: self.confident_leader,
      inspiring_leader: self.inspiring_leader,
      when_new_role:    self.when_new_role,
      confidence_built: self.confidence_built,
      detail:           decode_survey_detail(&self.detail_json)?,
    })
  }
}

/// Raw column values read from an `audit_events` row.
pub struct RawAuditEvent {
  pub id:          i64,
  pub user:        String,
  pub action:      String,
  pub recorded_at: String,
}

impl RawAuditEvent {
  pub fn into_event(self) -> Result<AuditEvent> {
    Ok(AuditEvent {
      id:          self.id,
      user:        self.user,
      action:      self.action,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
