//! The `TrackerStore` trait and supporting batch types.
//!
//! The trait is implemented by storage backends (e.g. `tracker-store-sqlite`).
//! Higher layers (ingestion, reporting, the HTTP API) depend on this
//! abstraction, not on any concrete backend.
//!
//! Role history is append-only: a role and its linking change event are
//! written together, atomically, and "current role" is always derived from
//! the event chain — never stored directly.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  application::{
    Application, LeadershipSurvey, NewApplication, NewLeadershipSurvey,
  },
  audit::AuditEvent,
  candidate::{Candidate, EmailUpdate, NewCandidate},
  lookup::{
    AgeRange, Belief, DimensionValue, Ethnicity, Gender, Grade, Location,
    LocationTag, MainJobType, Organisation, OrganisationRequest, Profession,
    PromotionType, ReportDimension, Scheme, Sexuality, WorkingPattern,
  },
  role::{NewRole, Role, RoleChangeEvent},
};

// ─── Lookup snapshot ─────────────────────────────────────────────────────────

/// An in-memory snapshot of every lookup dimension, loaded once per unit of
/// work. Datasets are small (tens of rows per table), so reconciliation
/// resolves free text against this snapshot instead of issuing a query per
/// cell.
#[derive(Debug, Clone, Default)]
pub struct LookupSets {
  pub grades:           Vec<Grade>,
  pub professions:      Vec<Profession>,
  pub locations:        Vec<Location>,
  pub ethnicities:      Vec<Ethnicity>,
  pub genders:          Vec<Gender>,
  pub sexualities:      Vec<Sexuality>,
  pub beliefs:          Vec<Belief>,
  pub working_patterns: Vec<WorkingPattern>,
  pub age_ranges:       Vec<AgeRange>,
  pub main_job_types:   Vec<MainJobType>,
  pub schemes:          Vec<Scheme>,
  pub promotion_types:  Vec<PromotionType>,
}

impl LookupSets {
  pub fn grade_by_value(&self, value: &str) -> Option<&Grade> {
    self.grades.iter().find(|g| g.value == value)
  }

  pub fn scheme_by_name(&self, name: &str) -> Option<&Scheme> {
    self.schemes.iter().find(|s| s.name == name)
  }

  pub fn promotion_type(&self, value: &str) -> Option<&PromotionType> {
    self.promotion_types.iter().find(|p| p.value == value)
  }

  pub fn profession_by_value(&self, value: &str) -> Option<&Profession> {
    self.professions.iter().find(|p| p.value == value)
  }

  pub fn location_by_value(&self, value: &str) -> Option<&Location> {
    self.locations.iter().find(|l| l.value == value)
  }
}

// ─── Batch ingestion types ───────────────────────────────────────────────────

/// Everything one ingested row produces, fully resolved except for the
/// organisation (created on demand inside the batch transaction).
///
/// `recent_role.organisation_id` is filled in by the store from
/// `organisation` once the department/ALB rows exist.
#[derive(Debug, Clone)]
pub struct CandidateBundle {
  pub candidate:    NewCandidate,
  pub organisation: Option<OrganisationRequest>,
  pub application:  NewApplication,
  /// The "most recent role", dated one year before the scheme start.
  pub recent_role:  NewRole,
  /// The "first role", dated at the candidate's joining date.
  pub first_role:   NewRole,
}

/// Counts reported back from a committed ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
  pub candidates:            usize,
  pub organisations_created: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a talent-tracker storage backend.
///
/// Multi-statement mutations (`new_role`, `submit_role_update`,
/// `ingest_candidates`) are atomic: either every row they describe is
/// persisted or none is. All methods return `Send` futures so the trait can
/// be used from multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lookup dimensions ─────────────────────────────────────────────────

  /// Snapshot every lookup dimension for in-memory reconciliation.
  fn lookup_sets(
    &self,
  ) -> impl Future<Output = Result<LookupSets, Self::Error>> + Send + '_;

  fn list_grades(
    &self,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  fn find_scheme_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Scheme>, Self::Error>> + Send + 'a;

  fn find_organisation_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Organisation>, Self::Error>> + Send + 'a;

  /// Look up or create the department (and, when requested, its arms-length
  /// body, parent-linked to the department). Returns the organisation the
  /// candidate belongs to: the ALB when one is named, otherwise the
  /// department.
  fn ensure_organisation(
    &self,
    request: OrganisationRequest,
  ) -> impl Future<Output = Result<Organisation, Self::Error>> + Send + '_;

  /// Enumerate the values of a report dimension in natural (id) order.
  fn list_dimension_values(
    &self,
    dimension: ReportDimension,
  ) -> impl Future<Output = Result<Vec<DimensionValue>, Self::Error>> + Send + '_;

  /// Ids of candidates whose characteristic reference points at `value_id`.
  /// The explicit replacement for a per-dimension reverse relation.
  fn candidates_with(
    &self,
    dimension: ReportDimension,
    value_id: i64,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  // ── Lookup seeding (insert-if-absent; existing values are never
  //    overwritten) ──────────────────────────────────────────────────────

  fn insert_grade<'a>(
    &'a self,
    value: &'a str,
    rank: i64,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + 'a;

  fn insert_organisation<'a>(
    &'a self,
    name: &'a str,
    department: bool,
    arms_length_body: bool,
  ) -> impl Future<Output = Result<Organisation, Self::Error>> + Send + 'a;

  fn insert_profession<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<Profession, Self::Error>> + Send + 'a;

  fn insert_location<'a>(
    &'a self,
    value: &'a str,
    tag: Option<LocationTag>,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + 'a;

  fn insert_ethnicity<'a>(
    &'a self,
    value: &'a str,
    bame: bool,
  ) -> impl Future<Output = Result<Ethnicity, Self::Error>> + Send + 'a;

  fn insert_gender<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<Gender, Self::Error>> + Send + 'a;

  fn insert_sexuality<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<Sexuality, Self::Error>> + Send + 'a;

  fn insert_belief<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<Belief, Self::Error>> + Send + 'a;

  fn insert_working_pattern<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<WorkingPattern, Self::Error>> + Send + 'a;

  fn insert_age_range<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<AgeRange, Self::Error>> + Send + 'a;

  fn insert_main_job_type<'a>(
    &'a self,
    value: &'a str,
    lower_socio_economic_background: bool,
  ) -> impl Future<Output = Result<MainJobType, Self::Error>> + Send + 'a;

  fn insert_scheme<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Scheme, Self::Error>> + Send + 'a;

  fn insert_promotion_type<'a>(
    &'a self,
    value: &'a str,
  ) -> impl Future<Output = Result<PromotionType, Self::Error>> + Send + 'a;

  // ── Candidates ────────────────────────────────────────────────────────

  fn create_candidate(
    &self,
    input: NewCandidate,
  ) -> impl Future<Output = Result<Candidate, Self::Error>> + Send + '_;

  fn get_candidate(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + '_;

  /// Wizard search path: matches either the primary or the secondary slot.
  fn find_candidate_by_email<'a>(
    &'a self,
    address: &'a str,
  ) -> impl Future<Output = Result<Option<Candidate>, Self::Error>> + Send + 'a;

  /// Uniqueness violations (address already held by another candidate)
  /// surface as a storage error; they are never swallowed.
  fn update_email(
    &self,
    candidate_id: i64,
    update: EmailUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_name<'a>(
    &'a self,
    candidate_id: i64,
    first_name: &'a str,
    last_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Role history ──────────────────────────────────────────────────────

  /// Append a role snapshot and its linking change event in one transaction.
  /// The event's `former_role_id` is the candidate's current role before
  /// this call (`None` for a first role); the new role becomes current.
  ///
  /// Start-date monotonicity is not enforced (matching the system this
  /// replaces); implementations log out-of-order dates.
  fn new_role(
    &self,
    candidate_id: i64,
    input: NewRole,
  ) -> impl Future<Output = Result<(Role, RoleChangeEvent), Self::Error>> + Send + '_;

  /// The wizard's final commit: a role change plus an optional email change,
  /// all-or-nothing.
  fn submit_role_update(
    &self,
    candidate_id: i64,
    role: NewRole,
    email: Option<EmailUpdate>,
  ) -> impl Future<Output = Result<(Role, RoleChangeEvent), Self::Error>> + Send + '_;

  /// `new_role` of the change event with the latest `(change_date, id)`, or
  /// `None` for a candidate with no history.
  fn current_role(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_;

  fn current_grade(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Grade>, Self::Error>> + Send + '_;

  fn current_location(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_;

  /// All roles for a candidate, newest `date_started` first.
  fn role_history(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  /// Roles started on or after `since`, newest first.
  fn roles_since(
    &self,
    candidate_id: i64,
    since: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  fn role_change_events(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Vec<RoleChangeEvent>, Self::Error>> + Send + '_;

  /// Whether `role_id` out-ranks the former role named by its change event.
  /// `false` for a candidate's first role (nothing to compare against).
  fn is_promotion(
    &self,
    role_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether a change event of exactly the requested kind (`substantive`
  /// when `temporary` is false, `temporary` otherwise) falls inside
  /// `[after, before]` inclusive. `before` defaults to today. Level
  /// transfers and demotions never count; an inverted window is vacuously
  /// false.
  fn promoted_between(
    &self,
    candidate_id: i64,
    after: NaiveDate,
    before: Option<NaiveDate>,
    temporary: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn record_application(
    &self,
    candidate_id: i64,
    input: NewApplication,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  /// The application with the latest `application_date`, or `None`.
  fn most_recent_application(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  /// The scheme of the most recent application, or `None` when the
  /// candidate has never applied.
  fn current_scheme(
    &self,
    candidate_id: i64,
  ) -> impl Future<Output = Result<Option<Scheme>, Self::Error>> + Send + '_;

  /// Move an application's intake to a new scheme start date.
  fn defer_application(
    &self,
    application_id: i64,
    new_start_date: NaiveDate,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  fn record_leadership_survey(
    &self,
    input: NewLeadershipSurvey,
  ) -> impl Future<Output = Result<LeadershipSurvey, Self::Error>> + Send + '_;

  fn leadership_survey_for(
    &self,
    application_id: i64,
  ) -> impl Future<Output = Result<Option<LeadershipSurvey>, Self::Error>> + Send + '_;

  // ── Batch ingestion ───────────────────────────────────────────────────

  /// Persist a reconciled batch in one transaction: organisations are
  /// created on demand, then each bundle's candidate, application, first
  /// role, and most-recent role (with their change events). Any failure
  /// rolls back the entire batch.
  fn ingest_candidates(
    &self,
    bundles: Vec<CandidateBundle>,
  ) -> impl Future<Output = Result<IngestSummary, Self::Error>> + Send + '_;

  // ── Audit ─────────────────────────────────────────────────────────────

  fn record_audit_event<'a>(
    &'a self,
    user: &'a str,
    action: &'a str,
  ) -> impl Future<Output = Result<AuditEvent, Self::Error>> + Send + 'a;

  fn list_audit_events(
    &self,
  ) -> impl Future<Output = Result<Vec<AuditEvent>, Self::Error>> + Send + '_;
}
