//! Per-row reconciliation strategies.
//!
//! A strategy turns one joined row into the personal fields and resolved
//! protected-characteristic references of a candidate. The standard strategy
//! carries the row's real values; the redacted strategy is a drop-in
//! replacement that anonymises identity fields and replaces every
//! characteristic with a uniform draw from the corresponding dimension, so a
//! redacted batch keeps the statistical shape of a real one.

use rand::{Rng, seq::SliceRandom};
use tracker_core::store::LookupSets;

use crate::{Error, Result, columns::ColumnMap, join::JoinedRow};

pub const REDACTED_FIRST_NAME: &str = "[REDACTED - FIRST NAME]";
pub const REDACTED_LAST_NAME: &str = "[REDACTED - LAST NAME]";
pub const REDACTED_JOB_TITLE: &str = "[REDACTED - JOB TITLE]";

/// Identity fields taken from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personal {
  pub first_name:      String,
  pub last_name:       String,
  pub job_title:       String,
  pub primary_email:   String,
  pub secondary_email: Option<String>,
}

/// Protected-characteristic references resolved against the lookup snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characteristics {
  pub caring_responsibility:      Option<bool>,
  pub long_term_health_condition: Option<bool>,
  pub age_range_id:               Option<i64>,
  pub working_pattern_id:         Option<i64>,
  pub belief_id:                  Option<i64>,
  pub sexuality_id:               Option<i64>,
  pub gender_id:                  Option<i64>,
  pub ethnicity_id:               Option<i64>,
  pub main_job_type_id:           Option<i64>,
}

/// The shared row-processing contract the upload is polymorphic over.
pub trait RowStrategy: Send + Sync {
  fn personal(
    &self,
    row: &JoinedRow,
    row_index: usize,
    columns: &ColumnMap,
  ) -> Result<Personal>;

  fn characteristics(
    &self,
    row: &JoinedRow,
    columns: &ColumnMap,
    lookups: &LookupSets,
  ) -> Characteristics;
}

// ─── Translators ─────────────────────────────────────────────────────────────

/// "Yes" means true; anything else (including "No" and free text) is false.
pub fn yes_is_true(response: &str) -> bool { response == "Yes" }

/// Tri-state survey answer: blank is "prefer not to say".
fn yes_no_or_unknown(response: &str) -> Option<bool> {
  if response.is_empty() {
    None
  } else {
    Some(yes_is_true(response))
  }
}

/// Split a free-text cell holding one or two addresses separated by comma,
/// semicolon, or whitespace.
pub fn split_addresses(cell: &str) -> Vec<String> {
  cell
    .replace([',', ';'], " ")
    .split_whitespace()
    .map(str::to_string)
    .collect()
}

// ─── Standard strategy ───────────────────────────────────────────────────────

/// Carries the row's real values into the candidate record.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStrategy;

impl RowStrategy for StandardStrategy {
  fn personal(
    &self,
    row: &JoinedRow,
    row_index: usize,
    columns: &ColumnMap,
  ) -> Result<Personal> {
    let addresses =
      split_addresses(row.application.get(&columns.application.email));
    let Some(primary_email) = addresses.first().cloned() else {
      return Err(Error::InvalidField {
        row:   row_index,
        field: columns.application.email.clone(),
      });
    };

    let title = row.intake.get(&columns.intake.job_title);
    Ok(Personal {
      first_name: row.intake.get(&columns.intake.first_name).to_string(),
      last_name: row.intake.get(&columns.intake.last_name).to_string(),
      job_title: if title.is_empty() {
        "Not provided".to_string()
      } else {
        title.to_string()
      },
      primary_email,
      secondary_email: addresses.get(1).cloned(),
    })
  }

  fn characteristics(
    &self,
    row: &JoinedRow,
    columns: &ColumnMap,
    lookups: &LookupSets,
  ) -> Characteristics {
    // Exact value match against the dimension; anything unmatched stays
    // empty rather than being substituted with a different value.
    let intake = &row.intake;
    let application = &row.application;
    Characteristics {
      caring_responsibility:      yes_no_or_unknown(
        intake.get(&columns.intake.caring_responsibility),
      ),
      long_term_health_condition: yes_no_or_unknown(
        intake.get(&columns.intake.disability),
      ),
      age_range_id:               lookups
        .age_ranges
        .iter()
        .find(|v| v.value == intake.get(&columns.intake.age_group))
        .map(|v| v.id),
      working_pattern_id:         lookups
        .working_patterns
        .iter()
        .find(|v| v.value == intake.get(&columns.intake.working_pattern))
        .map(|v| v.id),
      belief_id:                  lookups
        .beliefs
        .iter()
        .find(|v| v.value == intake.get(&columns.intake.belief))
        .map(|v| v.id),
      sexuality_id:               lookups
        .sexualities
        .iter()
        .find(|v| v.value == application.get(&columns.application.sexuality))
        .map(|v| v.id),
      gender_id:                  lookups
        .genders
        .iter()
        .find(|v| v.value == intake.get(&columns.intake.gender))
        .map(|v| v.id),
      ethnicity_id:               lookups
        .ethnicities
        .iter()
        .find(|v| v.value == application.get(&columns.application.ethnicity))
        .map(|v| v.id),
      main_job_type_id:           lookups
        .main_job_types
        .iter()
        .find(|v| v.value == application.get(&columns.application.main_job_type))
        .map(|v| v.id),
    }
  }
}

// ─── Redacted strategy ───────────────────────────────────────────────────────

/// Anonymises identity fields and randomises every characteristic.
///
/// The synthetic primary email is `{person-id}@gov.uk` so redacted runs stay
/// joinable on the personnel identifier; the secondary address is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactedStrategy;

impl RowStrategy for RedactedStrategy {
  fn personal(
    &self,
    row: &JoinedRow,
    row_index: usize,
    columns: &ColumnMap,
  ) -> Result<Personal> {
    let person_id = row.application.get(&columns.join.application_key);
    if person_id.is_empty() {
      return Err(Error::InvalidField {
        row:   row_index,
        field: columns.join.application_key.clone(),
      });
    }

    Ok(Personal {
      first_name:      REDACTED_FIRST_NAME.to_string(),
      last_name:       REDACTED_LAST_NAME.to_string(),
      job_title:       REDACTED_JOB_TITLE.to_string(),
      primary_email:   format!("{person_id}@gov.uk"),
      secondary_email: None,
    })
  }

  fn characteristics(
    &self,
    _row: &JoinedRow,
    _columns: &ColumnMap,
    lookups: &LookupSets,
  ) -> Characteristics {
    // Uniform draws from the full value sets: the row's true answers never
    // reach the store, but the fields are always in-set, never empty.
    let mut rng = rand::thread_rng();
    Characteristics {
      caring_responsibility:      Some(rng.gen_bool(0.5)),
      long_term_health_condition: Some(rng.gen_bool(0.5)),
      age_range_id:               lookups.age_ranges.choose(&mut rng).map(|v| v.id),
      working_pattern_id:         lookups
        .working_patterns
        .choose(&mut rng)
        .map(|v| v.id),
      belief_id:                  lookups.beliefs.choose(&mut rng).map(|v| v.id),
      sexuality_id:               lookups.sexualities.choose(&mut rng).map(|v| v.id),
      gender_id:                  lookups.genders.choose(&mut rng).map(|v| v.id),
      ethnicity_id:               lookups.ethnicities.choose(&mut rng).map(|v| v.id),
      main_job_type_id:           lookups
        .main_job_types
        .choose(&mut rng)
        .map(|v| v.id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::Row;

  #[test]
  fn yes_translator_only_accepts_yes() {
    assert!(yes_is_true("Yes"));
    assert!(!yes_is_true("No"));
    assert!(!yes_is_true("yes"));
    assert!(!yes_is_true(""));
  }

  #[test]
  fn addresses_split_on_comma_semicolon_and_whitespace() {
    for cell in [
      "one@gov.uk,two@gov.uk",
      "one@gov.uk; two@gov.uk",
      "one@gov.uk two@gov.uk",
    ] {
      assert_eq!(
        split_addresses(cell),
        ["one@gov.uk", "two@gov.uk"],
        "cell {cell:?}"
      );
    }
    assert_eq!(split_addresses("only@gov.uk"), ["only@gov.uk"]);
    assert!(split_addresses("").is_empty());
  }

  #[test]
  fn standard_personal_takes_first_and_second_address() {
    let row = JoinedRow {
      intake:      Row::from_pairs([
        ("First Name", "James"),
        ("Last Name", "Example"),
        ("Job Title", ""),
      ]),
      application: Row::from_pairs([(
        "Email Address",
        "a@gov.uk; b@gov.uk",
      )]),
    };
    let personal = StandardStrategy
      .personal(&row, 0, &ColumnMap::default())
      .unwrap();
    assert_eq!(personal.primary_email, "a@gov.uk");
    assert_eq!(personal.secondary_email.as_deref(), Some("b@gov.uk"));
    // Blank title falls back to the placeholder.
    assert_eq!(personal.job_title, "Not provided");
  }

  #[test]
  fn redacted_personal_synthesises_email_from_person_id() {
    let row = JoinedRow {
      intake:      Row::from_pairs([("First Name", "James")]),
      application: Row::from_pairs([("PerID", "PU007")]),
    };
    let personal = RedactedStrategy
      .personal(&row, 0, &ColumnMap::default())
      .unwrap();
    assert_eq!(personal.first_name, REDACTED_FIRST_NAME);
    assert_eq!(personal.last_name, REDACTED_LAST_NAME);
    assert_eq!(personal.primary_email, "PU007@gov.uk");
    assert_eq!(personal.secondary_email, None);
  }
}
