//! Column contracts for the two ingestion extracts.
//!
//! The extracts are produced by external systems whose header rows change
//! between programme years, so every column name the pipeline touches lives
//! here as configuration. The defaults are the headers of the current
//! extracts; a config file can override any of them without touching
//! pipeline logic.

use serde::Deserialize;

/// How the two extracts are joined and filtered.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JoinColumns {
  /// Personnel identifier on the intake side.
  pub intake_key:        String,
  /// Personnel identifier on the application side.
  pub application_key:   String,
  /// Outcome column on the application side.
  pub status:            String,
  /// Only rows whose status cell equals this value are ingested.
  pub successful_status: String,
}

impl Default for JoinColumns {
  fn default() -> Self {
    Self {
      intake_key:        "Psych. Username".into(),
      application_key:   "PerID".into(),
      status:            "Status".into(),
      successful_status: "Successful".into(),
    }
  }
}

/// Columns read from the intake roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeColumns {
  pub first_name:            String,
  pub last_name:             String,
  pub gender:                String,
  pub caring_responsibility: String,
  pub disability:            String,
  pub age_group:             String,
  pub working_pattern:       String,
  pub belief:                String,
  pub completed_fast_stream: String,
  pub joining_year:          String,
  pub joining_grade:         String,
  pub current_grade:         String,
  pub job_title:             String,
  pub department:            String,
  pub arms_length_body:      String,
  /// Sentinel value in the ALB column meaning "no arms-length body".
  pub alb_not_applicable:    String,
  pub profession:            String,
  pub location:              String,
  pub cohort:                String,
  pub meta:                  String,
  pub delta:                 String,
}

impl Default for IntakeColumns {
  fn default() -> Self {
    Self {
      first_name:            "First Name".into(),
      last_name:             "Last Name".into(),
      gender:                "Gender".into(),
      caring_responsibility: "Caring Responsibility".into(),
      disability:            "Disabled".into(),
      age_group:             "Age Group".into(),
      working_pattern:       "Working Pattern".into(),
      belief:                "Religion/Belief".into(),
      completed_fast_stream: "Have you completed Fast Stream?".into(),
      joining_year:          "CS Joining Year".into(),
      joining_grade:         "CS Joining Grade".into(),
      current_grade:         "Current Grade".into(),
      job_title:             "Job Title".into(),
      department:            "Department".into(),
      arms_length_body:      "ALB".into(),
      alb_not_applicable:    "Not Applicable".into(),
      profession:            "Profession".into(),
      location:              "Location".into(),
      cohort:                "Cohort".into(),
      meta:                  "META".into(),
      delta:                 "DELTA".into(),
    }
  }
}

/// Columns read from the application-outcomes extract.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationColumns {
  /// Free-text cell that may hold one or two addresses.
  pub email:              String,
  pub sexuality:          String,
  pub ethnicity:          String,
  /// The main-income-earner job question, used for socio-economic
  /// background.
  pub main_job_type:      String,
  pub aspirational_grade: String,
  pub employee_number:    String,
}

impl Default for ApplicationColumns {
  fn default() -> Self {
    Self {
      email:              "Email Address".into(),
      sexuality:          "Sexual Orientation".into(),
      ethnicity:          "Ethnicity".into(),
      main_job_type:
        "Describes the sort of work the main/ highest income earner in your \
         household did in their main job?"
          .into(),
      aspirational_grade: "Aspirational Grade".into(),
      employee_number:    "Employee Number".into(),
    }
  }
}

/// The full column contract for one upload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
  pub join:        JoinColumns,
  pub intake:      IntakeColumns,
  pub application: ApplicationColumns,
}
