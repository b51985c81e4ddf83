//! Promotion-report tests against an in-memory SQLite store.

use chrono::NaiveDate;
use tracker_core::{
  application::NewApplication,
  candidate::NewCandidate,
  lookup::{ReportDimension, change_type},
  role::NewRole,
  store::TrackerStore,
};
use tracker_report::{promotion_rate_report, render::promotion_csv};
use tracker_store_sqlite::SqliteStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seeded_store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.unwrap();
  s.insert_grade("Grade 7", 6).await.unwrap();
  s.insert_grade("Grade 6", 5).await.unwrap();
  s.insert_scheme("FLS").await.unwrap();
  s.insert_scheme("SLS").await.unwrap();
  for value in [
    change_type::TEMPORARY,
    change_type::SUBSTANTIVE,
    change_type::LEVEL_TRANSFER,
    change_type::DEMOTION,
  ] {
    s.insert_promotion_type(value).await.unwrap();
  }
  s.insert_ethnicity("White British", false).await.unwrap();
  s.insert_ethnicity("Black British", true).await.unwrap();
  s.insert_ethnicity("Prefer not to say", false).await.unwrap();
  s
}

/// Candidate on `scheme` with the given ethnicity; optionally promoted
/// Grade 7 → Grade 6 inside the 2019 report window with `promotion` kind.
async fn candidate(
  s: &SqliteStore,
  email: &str,
  ethnicity: &str,
  scheme: &str,
  promotion: Option<&str>,
) -> i64 {
  let lookups = s.lookup_sets().await.unwrap();
  let ethnicity_id = lookups
    .ethnicities
    .iter()
    .find(|e| e.value == ethnicity)
    .unwrap()
    .id;
  let scheme_id = lookups.scheme_by_name(scheme).unwrap().id;
  let substantive = lookups
    .promotion_type(change_type::SUBSTANTIVE)
    .unwrap()
    .id;
  let grade7 = lookups.grade_by_value("Grade 7").unwrap().id;
  let grade6 = lookups.grade_by_value("Grade 6").unwrap().id;

  let c = s
    .create_candidate(NewCandidate {
      first_name:                 "Case".into(),
      last_name:                  "Candidate".into(),
      primary_email:              email.into(),
      secondary_email:            None,
      joining_date:               date(2014, 1, 1),
      completed_fast_stream:      false,
      caring_responsibility:      None,
      long_term_health_condition: None,
      joining_grade_id:           Some(grade7),
      age_range_id:               None,
      working_pattern_id:         None,
      belief_id:                  None,
      sexuality_id:               None,
      gender_id:                  None,
      ethnicity_id:               Some(ethnicity_id),
      main_job_type_id:           None,
    })
    .await
    .unwrap();

  s.record_application(c.id, NewApplication {
    scheme_id,
    application_date: date(2019, 3, 1),
    scheme_start_date: date(2019, 3, 1),
    aspirational_grade_id: None,
    employee_number: None,
    successful: true,
    meta: false,
    delta: false,
    cohort: Some(7),
  })
  .await
  .unwrap();

  s.new_role(c.id, NewRole {
    date_started:    date(2018, 1, 1),
    title:           "Starting role".into(),
    organisation_id: None,
    profession_id:   None,
    location_id:     None,
    grade_id:        grade7,
    change_type_id:  substantive,
  })
  .await
  .unwrap();

  if let Some(kind) = promotion {
    let change_type_id = lookups.promotion_type(kind).unwrap().id;
    s.new_role(c.id, NewRole {
      date_started:    date(2019, 12, 1),
      title:           "Promoted role".into(),
      organisation_id: None,
      profession_id:   None,
      location_id:     None,
      grade_id:        grade6,
      change_type_id,
    })
    .await
    .unwrap();
  }

  c.id
}

#[tokio::test]
async fn report_counts_kind_exact_promotions_per_group() {
  let s = seeded_store().await;

  // Black British on FLS: one substantive, one temporary, two unpromoted.
  candidate(&s, "b1@gov.uk", "Black British", "FLS", Some(change_type::SUBSTANTIVE)).await;
  candidate(&s, "b2@gov.uk", "Black British", "FLS", Some(change_type::TEMPORARY)).await;
  candidate(&s, "b3@gov.uk", "Black British", "FLS", None).await;
  candidate(&s, "b4@gov.uk", "Black British", "FLS", None).await;
  // White British promoted, but on SLS: excluded from an FLS report.
  candidate(&s, "w1@gov.uk", "White British", "SLS", Some(change_type::SUBSTANTIVE)).await;

  let report = promotion_rate_report(
    &s,
    "reporter",
    "FLS",
    2019,
    ReportDimension::Ethnicity,
  )
  .await
  .unwrap();

  assert_eq!(report.rows.len(), 3);

  let white = &report.rows[0];
  assert_eq!(white.label, "White British");
  assert_eq!(white.total, 1);
  assert_eq!(white.substantive.count, 0);

  let black = &report.rows[1];
  assert_eq!(black.label, "Black British");
  assert_eq!(black.total, 4);
  assert_eq!(black.substantive.count, 1);
  assert_eq!(black.substantive.rate, 0.25);
  assert_eq!(black.temporary.count, 1);
  assert_eq!(black.temporary.rate, 0.25);

  // Nobody picked "Prefer not to say": zero total, zero rate, no fault.
  let unknown = &report.rows[2];
  assert_eq!(unknown.total, 0);
  assert_eq!(unknown.substantive.rate, 0.0);

  let csv = promotion_csv(&report).unwrap();
  assert!(csv.starts_with("characteristic,"));
  assert!(csv.contains("Black British,1,25%,1,25%,4"));
  assert!(csv.contains("Prefer not to say,0,0%,0,0%,0"));
}

#[tokio::test]
async fn report_generation_is_audited() {
  let s = seeded_store().await;
  promotion_rate_report(&s, "reporter", "FLS", 2018, ReportDimension::Ethnicity)
    .await
    .unwrap();

  let events = s.list_audit_events().await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].user, "reporter");
  assert_eq!(
    events[0].action,
    "Generated a promotions report on ethnicity for FLS 2018 intake"
  );
}

#[tokio::test]
async fn unknown_scheme_is_rejected_before_any_aggregation() {
  let s = seeded_store().await;
  let err = promotion_rate_report(
    &s,
    "reporter",
    "NOPE",
    2019,
    ReportDimension::Ethnicity,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, tracker_report::Error::UnknownScheme(_)));
  assert!(s.list_audit_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn promotions_outside_the_window_are_not_credited() {
  let s = seeded_store().await;
  // Promoted 2019-12-01; the 2020 report window starts 2020-03-01.
  candidate(&s, "late@gov.uk", "Black British", "FLS", Some(change_type::SUBSTANTIVE)).await;

  let report = promotion_rate_report(
    &s,
    "reporter",
    "FLS",
    2020,
    ReportDimension::Ethnicity,
  )
  .await
  .unwrap();
  let black = report
    .rows
    .iter()
    .find(|r| r.label == "Black British")
    .unwrap();
  assert_eq!(black.total, 1);
  assert_eq!(black.substantive.count, 0);
}
