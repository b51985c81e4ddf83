//! End-to-end upload tests against an in-memory SQLite store.

use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use tracker_core::{
  lookup::change_type,
  store::TrackerStore,
};
use tracker_ingest::{ColumnMap, Upload, UploadConfig};
use tracker_store_sqlite::SqliteStore;

const INTAKE_CSV: &str = "\
Psych. Username,First Name,Last Name,Gender,Caring Responsibility,Disabled,\
Age Group,Working Pattern,Religion/Belief,Have you completed Fast Stream?,\
CS Joining Year,CS Joining Grade,Current Grade,Job Title,Department,ALB,\
Profession,Location,Cohort,META,DELTA
PU007,James,Example,Male,Yes,No,25-29,Full time,No Religion,Yes,2014,\
Grade 7,Grade 6,Policy advisor,Foreign and Commonwealth Office,SIS,\
Policy,London,7,yes,
PU008,Avery,Other,Female,No,No,30-34,Full time,No Religion,No,2015,\
Grade 7,Grade 7,Analyst,Cabinet Office,Not Applicable,Policy,London,7,,
";

const APPLICATION_CSV: &str = "\
PerID,Status,Email Address,Sexual Orientation,Ethnicity,\
\"Describes the sort of work the main/ highest income earner in your \
household did in their main job?\",Aspirational Grade,Employee Number
PU007,Successful,\"james@gov.uk; james.home@gov.uk\",Bisexual,Arab,\
Modern professional,Deputy Director (SCS1),E1234
PU008,Unsuccessful,avery@gov.uk,Straight,Arab,Modern professional,,E9999
";

fn write_fixture(dir: &str, name: &str, content: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("tracker-ingest-{dir}"));
  fs::create_dir_all(&dir).unwrap();
  let path = dir.join(name);
  fs::write(&path, content).unwrap();
  path
}

async fn seeded_store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.unwrap();
  s.insert_grade("Grade 7", 6).await.unwrap();
  s.insert_grade("Grade 6", 5).await.unwrap();
  s.insert_grade("Deputy Director (SCS1)", 4).await.unwrap();
  s.insert_grade("Prefer not to say", 99).await.unwrap();
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
  s.insert_gender("Male").await.unwrap();
  s.insert_gender("Female").await.unwrap();
  s.insert_sexuality("Bisexual").await.unwrap();
  s.insert_sexuality("Straight").await.unwrap();
  s.insert_ethnicity("Arab", true).await.unwrap();
  s.insert_age_range("25-29").await.unwrap();
  s.insert_belief("No Religion").await.unwrap();
  s.insert_working_pattern("Full time").await.unwrap();
  s.insert_main_job_type("Modern professional", false).await.unwrap();
  s.insert_profession("Policy").await.unwrap();
  s.insert_location("London", None).await.unwrap();
  s
}

fn config(redact: bool) -> UploadConfig {
  UploadConfig {
    scheme: "FLS".into(),
    scheme_start_date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
    redact,
    columns: ColumnMap::default(),
  }
}

#[tokio::test]
async fn upload_creates_one_candidate_per_successful_row() {
  let intake = write_fixture("standard", "intake.csv", INTAKE_CSV);
  let application =
    write_fixture("standard", "application.csv", APPLICATION_CSV);

  let store = seeded_store().await;
  let summary = Upload::new(&store, config(false))
    .complete_upload(&intake, &application)
    .await
    .unwrap();

  // PU008's outcome is not "Successful", so only PU007 lands.
  assert_eq!(summary.candidates, 1);

  let candidate = store
    .find_candidate_by_email("james@gov.uk")
    .await
    .unwrap()
    .expect("ingested candidate");
  assert_eq!(candidate.first_name, "James");
  assert_eq!(
    candidate.secondary_email.as_deref(),
    Some("james.home@gov.uk")
  );
  assert_eq!(
    candidate.joining_date,
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()
  );

  // Two-role history with the pre-programme role current.
  assert_eq!(store.role_history(candidate.id).await.unwrap().len(), 2);
  let current_grade = store.current_grade(candidate.id).await.unwrap().unwrap();
  assert_eq!(current_grade.value, "Grade 6");

  // One application, flagged META only, with the aspirational grade.
  let application = store
    .most_recent_application(candidate.id)
    .await
    .unwrap()
    .unwrap();
  assert!(application.meta);
  assert!(!application.delta);
  assert_eq!(application.cohort, Some(7));
  assert!(application.aspirational_grade_id.is_some());

  // The ALB was created and linked under its department.
  let alb = store.find_organisation_by_name("SIS").await.unwrap().unwrap();
  let dept = store
    .find_organisation_by_name("Foreign and Commonwealth Office")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(alb.parent_organisation_id, Some(dept.id));
  let current_role = store.current_role(candidate.id).await.unwrap().unwrap();
  assert_eq!(current_role.organisation_id, Some(alb.id));
}

#[tokio::test]
async fn redacted_upload_never_stores_real_identities() {
  let intake = write_fixture("redacted", "intake.csv", INTAKE_CSV);
  let application =
    write_fixture("redacted", "application.csv", APPLICATION_CSV);

  let store = seeded_store().await;
  Upload::new(&store, config(true))
    .complete_upload(&intake, &application)
    .await
    .unwrap();

  // The real address is gone; the synthetic one is the person id.
  assert!(
    store
      .find_candidate_by_email("james@gov.uk")
      .await
      .unwrap()
      .is_none()
  );
  let candidate = store
    .find_candidate_by_email("PU007@gov.uk")
    .await
    .unwrap()
    .expect("redacted candidate");

  assert_eq!(candidate.first_name, "[REDACTED - FIRST NAME]");
  assert_eq!(candidate.last_name, "[REDACTED - LAST NAME]");
  assert_eq!(candidate.secondary_email, None);

  // Characteristics are drawn from the seeded dimensions, never left empty.
  let lookups = store.lookup_sets().await.unwrap();
  let gender_id = candidate.gender_id.expect("in-set gender");
  assert!(lookups.genders.iter().any(|g| g.id == gender_id));
  let sexuality_id = candidate.sexuality_id.expect("in-set sexuality");
  assert!(lookups.sexualities.iter().any(|s| s.id == sexuality_id));
  let ethnicity_id = candidate.ethnicity_id.expect("in-set ethnicity");
  assert!(lookups.ethnicities.iter().any(|e| e.id == ethnicity_id));

  let current_role = store.current_role(candidate.id).await.unwrap().unwrap();
  assert_eq!(current_role.title, "[REDACTED - JOB TITLE]");
}

#[tokio::test]
async fn unknown_scheme_aborts_before_touching_the_store() {
  let intake = write_fixture("badscheme", "intake.csv", INTAKE_CSV);
  let application =
    write_fixture("badscheme", "application.csv", APPLICATION_CSV);

  let store = seeded_store().await;
  let mut cfg = config(false);
  cfg.scheme = "NOPE".into();

  let err = Upload::new(&store, cfg)
    .complete_upload(&intake, &application)
    .await
    .unwrap_err();
  assert!(matches!(err, tracker_ingest::Error::UnknownScheme(_)));
  assert!(
    store
      .find_candidate_by_email("james@gov.uk")
      .await
      .unwrap()
      .is_none()
  );
}
