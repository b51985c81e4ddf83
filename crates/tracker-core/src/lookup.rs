//! Lookup dimensions — the small reference tables every candidate record
//! points into.
//!
//! Dimension values are effectively immutable reference data: they are seeded
//! before any candidate is written, and ingestion never overwrites an existing
//! value. The one exception is [`Organisation`], which ingestion creates on
//! demand when an extract names a department or arms-length body it has not
//! seen before.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ─── Seniority ───────────────────────────────────────────────────────────────

/// A civil-service grade. Lower `rank` means more senior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
  pub id:    i64,
  pub value: String,
  pub rank:  i64,
}

// ─── Organisations ───────────────────────────────────────────────────────────

/// A government department or one of its arms-length bodies. An ALB carries a
/// `parent_organisation_id` pointing at its sponsoring department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
  pub id:                     i64,
  pub name:                   String,
  pub parent_organisation_id: Option<i64>,
  pub department:             bool,
  pub arms_length_body:       bool,
}

/// The department/ALB pair named by an ingestion row, resolved to a concrete
/// [`Organisation`] (creating rows as needed) at persist time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationRequest {
  pub department:       String,
  /// `None` when the extract's ALB cell holds the "Not Applicable" sentinel;
  /// the candidate then belongs to the department itself.
  pub arms_length_body: Option<String>,
}

// ─── Plain value dimensions ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
  pub id:    i64,
  pub value: String,
}

/// Broad grouping for a work location, for reporting at the
/// London/Region/Overseas/Devolved level.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "title_case")]
#[serde(rename_all = "lowercase")]
pub enum LocationTag {
  London,
  Region,
  Overseas,
  Devolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub id:    i64,
  pub value: String,
  pub tag:   Option<LocationTag>,
}

/// The `bame` flag allows querying candidates at a broad ethnic-minority level
/// without enumerating individual ethnicities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ethnicity {
  pub id:    i64,
  pub value: String,
  pub bame:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gender {
  pub id:    i64,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sexuality {
  pub id:    i64,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belief {
  pub id:    i64,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingPattern {
  pub id:    i64,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
  pub id:    i64,
  pub value: String,
}

/// The main-income-earner job type question, used as a proxy for
/// socio-economic background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainJobType {
  pub id:    i64,
  pub value: String,
  pub lower_socio_economic_background: bool,
}

// ─── Schemes and role-change types ───────────────────────────────────────────

/// A leadership-development programme track (e.g. "FLS", "SLS").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
  pub id:   i64,
  pub name: String,
}

/// The kind of a role transition. Seeded with exactly four values:
/// `temporary`, `substantive`, `level transfer`, `demotion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionType {
  pub id:    i64,
  pub value: String,
}

/// Canonical role-change values. Promotion queries match these exactly, so
/// they are constants rather than free text at call sites.
pub mod change_type {
  pub const TEMPORARY: &str = "temporary";
  pub const SUBSTANTIVE: &str = "substantive";
  pub const LEVEL_TRANSFER: &str = "level transfer";
  pub const DEMOTION: &str = "demotion";
}

// ─── Report dimensions ───────────────────────────────────────────────────────

/// The protected-characteristic dimensions a promotion report can be broken
/// down by. Each maps to one lookup table and one candidate reference column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportDimension {
  Ethnicity,
  Gender,
  Sexuality,
  Belief,
  WorkingPattern,
  AgeRange,
  MainJobType,
}

/// One value of a report dimension, as enumerated for a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValue {
  pub id:    i64,
  pub value: String,
}
