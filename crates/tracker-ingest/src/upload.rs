//! Upload orchestration: read, join, reconcile, persist.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracker_core::{
  application::NewApplication,
  candidate::NewCandidate,
  lookup::{OrganisationRequest, change_type},
  role::NewRole,
  store::{CandidateBundle, IngestSummary, LookupSets, TrackerStore},
};

use crate::{
  Error, Result,
  columns::ColumnMap,
  join::{JoinedRow, join_rows},
  row::{RedactedStrategy, RowStrategy, StandardStrategy, yes_is_true},
  source::read_table,
};

/// Grade value substituted when an extract names a grade that is not in the
/// dimension. Seeded with the reference data; its absence fails the row.
const FALLBACK_GRADE: &str = "Prefer not to say";

/// Parameters for one upload run.
#[derive(Debug, Clone)]
pub struct UploadConfig {
  /// Scheme name the cohort is joining (e.g. "FLS").
  pub scheme:            String,
  pub scheme_start_date: NaiveDate,
  /// Swap in the redacting row strategy.
  pub redact:            bool,
  pub columns:           ColumnMap,
}

/// One bulk upload of an intake roster joined with application outcomes.
pub struct Upload<'a, S> {
  store:  &'a S,
  config: UploadConfig,
}

impl<'a, S: TrackerStore> Upload<'a, S> {
  pub fn new(store: &'a S, config: UploadConfig) -> Self {
    Self { store, config }
  }

  /// Run the full pipeline. The batch is persisted in one transaction: a
  /// failing row rolls back the entire upload.
  pub async fn complete_upload(
    &self,
    intake_path: &Path,
    application_path: &Path,
  ) -> Result<IngestSummary> {
    let intake = read_table(intake_path)?;
    let application = read_table(application_path)?;
    let joined = join_rows(intake, application, &self.config.columns);

    let lookups = self.store.lookup_sets().await.map_err(Error::store)?;
    let scheme = lookups
      .scheme_by_name(&self.config.scheme)
      .ok_or_else(|| Error::UnknownScheme(self.config.scheme.clone()))?
      .clone();

    let strategy: &dyn RowStrategy = if self.config.redact {
      &RedactedStrategy
    } else {
      &StandardStrategy
    };

    let mut bundles = Vec::with_capacity(joined.len());
    for (index, row) in joined.iter().enumerate() {
      bundles.push(build_bundle(
        row,
        index,
        strategy,
        &self.config.columns,
        &lookups,
        scheme.id,
        self.config.scheme_start_date,
      )?);
    }

    self
      .store
      .ingest_candidates(bundles)
      .await
      .map_err(Error::store)
  }
}

/// Reconcile one joined row into a persistable bundle.
pub fn build_bundle(
  row: &JoinedRow,
  row_index: usize,
  strategy: &dyn RowStrategy,
  columns: &ColumnMap,
  lookups: &LookupSets,
  scheme_id: i64,
  scheme_start_date: NaiveDate,
) -> Result<CandidateBundle> {
  let personal = strategy.personal(row, row_index, columns)?;
  let characteristics = strategy.characteristics(row, columns, lookups);

  let joining_year: i32 = row
    .intake
    .get(&columns.intake.joining_year)
    .parse()
    .map_err(|_| Error::InvalidField {
      row:   row_index,
      field: columns.intake.joining_year.clone(),
    })?;
  let joining_date = NaiveDate::from_ymd_opt(joining_year, 1, 1)
    .ok_or_else(|| Error::InvalidField {
      row:   row_index,
      field: columns.intake.joining_year.clone(),
    })?;

  let joining_grade_id = resolve_grade(
    lookups,
    row.intake.get(&columns.intake.joining_grade),
    row_index,
  )?;
  let current_grade_id = resolve_grade(
    lookups,
    row.intake.get(&columns.intake.current_grade),
    row_index,
  )?;

  let substantive_id = lookups
    .promotion_type(change_type::SUBSTANTIVE)
    .ok_or_else(|| {
      Error::UnknownChangeType(change_type::SUBSTANTIVE.to_string())
    })?
    .id;

  let candidate = NewCandidate {
    first_name:                 personal.first_name,
    last_name:                  personal.last_name,
    primary_email:              personal.primary_email,
    secondary_email:            personal.secondary_email,
    joining_date,
    completed_fast_stream:      yes_is_true(
      row.intake.get(&columns.intake.completed_fast_stream),
    ),
    caring_responsibility:      characteristics.caring_responsibility,
    long_term_health_condition: characteristics.long_term_health_condition,
    joining_grade_id:           Some(joining_grade_id),
    age_range_id:               characteristics.age_range_id,
    working_pattern_id:         characteristics.working_pattern_id,
    belief_id:                  characteristics.belief_id,
    sexuality_id:               characteristics.sexuality_id,
    gender_id:                  characteristics.gender_id,
    ethnicity_id:               characteristics.ethnicity_id,
    main_job_type_id:           characteristics.main_job_type_id,
  };

  let organisation = organisation_request(row, columns);

  let aspirational_grade_id = lookups
    .grade_by_value(row.application.get(&columns.application.aspirational_grade))
    .map(|g| g.id);
  let employee_number = row.application.get(&columns.application.employee_number);
  let cohort = row
    .intake
    .get(&columns.intake.cohort)
    .parse::<i64>()
    .ok();

  let application = NewApplication {
    scheme_id,
    // The extracts carry no application date; intake ordering uses the
    // scheme start.
    application_date: scheme_start_date,
    scheme_start_date,
    aspirational_grade_id,
    employee_number: (!employee_number.is_empty())
      .then(|| employee_number.to_string()),
    successful: true,
    meta: row.intake.has_value(&columns.intake.meta),
    delta: row.intake.has_value(&columns.intake.delta),
    cohort,
  };

  // Pre-programme role, dated the January before the scheme start year. The
  // organisation reference is resolved by the store inside the batch
  // transaction.
  let recent_start = NaiveDate::from_ymd_opt(scheme_start_date.year() - 1, 1, 1)
    .ok_or_else(|| Error::InvalidField {
      row:   row_index,
      field: "scheme start date".into(),
    })?;
  let recent_role = NewRole {
    date_started:    recent_start,
    title:           personal.job_title,
    organisation_id: None,
    profession_id:   lookups
      .profession_by_value(row.intake.get(&columns.intake.profession))
      .map(|p| p.id),
    location_id:     lookups
      .location_by_value(row.intake.get(&columns.intake.location))
      .map(|l| l.id),
    grade_id:        current_grade_id,
    change_type_id:  substantive_id,
  };

  let first_role = NewRole {
    date_started:    joining_date,
    title:           "Not given".to_string(),
    organisation_id: None,
    profession_id:   None,
    location_id:     None,
    grade_id:        joining_grade_id,
    change_type_id:  substantive_id,
  };

  Ok(CandidateBundle {
    candidate,
    organisation,
    application,
    recent_role,
    first_role,
  })
}

/// Exact grade match, falling back to the "Prefer not to say" grade. A value
/// that matches neither fails the row (and with it the batch).
fn resolve_grade(
  lookups: &LookupSets,
  value: &str,
  row_index: usize,
) -> Result<i64> {
  if let Some(grade) = lookups.grade_by_value(value) {
    return Ok(grade.id);
  }
  if let Some(fallback) = lookups.grade_by_value(FALLBACK_GRADE) {
    tracing::warn!(row = row_index, value, "grade not found, using fallback");
    return Ok(fallback.id);
  }
  Err(Error::UnknownGrade { row: row_index, value: value.to_string() })
}

/// The department/ALB pair named by the row, with the "Not Applicable"
/// sentinel collapsing to the department alone.
fn organisation_request(
  row: &JoinedRow,
  columns: &ColumnMap,
) -> Option<OrganisationRequest> {
  let department = row.intake.get(&columns.intake.department);
  if department.is_empty() {
    return None;
  }
  let alb = row.intake.get(&columns.intake.arms_length_body);
  let arms_length_body = (!alb.is_empty()
    && alb != columns.intake.alb_not_applicable)
    .then(|| alb.to_string());
  Some(OrganisationRequest { department: department.to_string(), arms_length_body })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::Row;

  fn lookups() -> LookupSets {
    use tracker_core::lookup::{Grade, PromotionType, Scheme};
    LookupSets {
      grades: vec![
        Grade { id: 1, value: "Grade 7".into(), rank: 6 },
        Grade { id: 2, value: "Grade 6".into(), rank: 5 },
        Grade { id: 3, value: "Prefer not to say".into(), rank: 99 },
      ],
      promotion_types: vec![PromotionType {
        id:    2,
        value: change_type::SUBSTANTIVE.into(),
      }],
      schemes: vec![Scheme { id: 1, name: "FLS".into() }],
      ..Default::default()
    }
  }

  fn joined_row() -> JoinedRow {
    JoinedRow {
      intake:      Row::from_pairs([
        ("Psych. Username", "PU007"),
        ("First Name", "James"),
        ("Last Name", "Example"),
        ("CS Joining Year", "2014"),
        ("CS Joining Grade", "Grade 7"),
        ("Current Grade", "Grade 6"),
        ("Job Title", "Policy advisor"),
        ("Department", "Foreign and Commonwealth Office"),
        ("ALB", "SIS"),
        ("Have you completed Fast Stream?", "Yes"),
        ("META", "yes"),
        ("Cohort", "7"),
      ]),
      application: Row::from_pairs([
        ("PerID", "PU007"),
        ("Email Address", "james@gov.uk"),
      ]),
    }
  }

  fn bundle_for(row: &JoinedRow) -> CandidateBundle {
    build_bundle(
      row,
      0,
      &StandardStrategy,
      &ColumnMap::default(),
      &lookups(),
      1,
      NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
    )
    .unwrap()
  }

  #[test]
  fn bundle_builds_two_roles_and_one_application() {
    let bundle = bundle_for(&joined_row());

    assert_eq!(bundle.candidate.primary_email, "james@gov.uk");
    assert!(bundle.candidate.completed_fast_stream);
    assert_eq!(
      bundle.candidate.joining_date,
      NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()
    );

    // Pre-programme role: January of the year before the scheme start.
    assert_eq!(
      bundle.recent_role.date_started,
      NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
    );
    assert_eq!(bundle.recent_role.grade_id, 2);
    assert_eq!(bundle.recent_role.title, "Policy advisor");

    // First role: joining date at the joining grade.
    assert_eq!(bundle.first_role.date_started, bundle.candidate.joining_date);
    assert_eq!(bundle.first_role.grade_id, 1);
    assert_eq!(bundle.first_role.title, "Not given");

    assert!(bundle.application.meta);
    assert!(!bundle.application.delta);
    assert_eq!(bundle.application.cohort, Some(7));
  }

  #[test]
  fn alb_links_into_the_organisation_request() {
    let bundle = bundle_for(&joined_row());
    let org = bundle.organisation.unwrap();
    assert_eq!(org.department, "Foreign and Commonwealth Office");
    assert_eq!(org.arms_length_body.as_deref(), Some("SIS"));
  }

  #[test]
  fn not_applicable_alb_collapses_to_the_department() {
    let mut row = joined_row();
    row.intake = Row::from_pairs([
      ("CS Joining Year", "2014"),
      ("CS Joining Grade", "Grade 7"),
      ("Current Grade", "Grade 6"),
      ("Department", "FCO"),
      ("ALB", "Not Applicable"),
    ]);
    let bundle = bundle_for(&row);
    let org = bundle.organisation.unwrap();
    assert_eq!(org.department, "FCO");
    assert_eq!(org.arms_length_body, None);
  }

  #[test]
  fn unknown_grade_falls_back_to_prefer_not_to_say() {
    let mut row = joined_row();
    row.intake = Row::from_pairs([
      ("CS Joining Year", "2014"),
      ("CS Joining Grade", "Something unheard of"),
      ("Current Grade", "Grade 6"),
    ]);
    let bundle = bundle_for(&row);
    assert_eq!(bundle.candidate.joining_grade_id, Some(3));
  }

  #[test]
  fn unknown_grade_without_fallback_fails_the_row() {
    let mut sets = lookups();
    sets.grades.retain(|g| g.value != "Prefer not to say");
    let mut row = joined_row();
    row.intake = Row::from_pairs([
      ("CS Joining Year", "2014"),
      ("CS Joining Grade", "Something unheard of"),
      ("Current Grade", "Grade 6"),
    ]);

    let err = build_bundle(
      &row,
      3,
      &StandardStrategy,
      &ColumnMap::default(),
      &sets,
      1,
      NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownGrade { row: 3, .. }));
  }
}
