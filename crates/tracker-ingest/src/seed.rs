//! Lookup-dimension seeding from the reference workbook.
//!
//! The workbook carries one sheet per dimension: the first column is the
//! display value, an optional second column the dimension-specific extra
//! (grade rank, BAME flag, location tag, …). Seeding is insert-if-absent
//! throughout — an existing value is never overwritten — so re-running it is
//! harmless. The fixed schemes and role-change types are seeded alongside.

use std::{path::Path, str::FromStr};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracker_core::{
  lookup::{LocationTag, change_type},
  store::TrackerStore,
};

use crate::{Error, Result, source::cell_to_string};

/// Sheet names mapped to the dimensions they seed.
const DIMENSION_SHEETS: &[&str] = &[
  "Department",
  "ALB",
  "Gender",
  "Sexual Orientation",
  "Ethnicity",
  "Grade",
  "Profession",
  "Location",
  "Age",
  "ReligionBelief",
  "Work Pattern",
  "main job type",
];

/// Counts reported back from a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
  pub sheets: usize,
  pub values: usize,
}

/// Seed every lookup dimension from `workbook_path`, then the fixed schemes
/// and role-change types.
pub async fn seed_lookups<S: TrackerStore>(
  store: &S,
  workbook_path: &Path,
) -> Result<SeedSummary> {
  let mut workbook: Xlsx<_> = open_workbook(workbook_path)?;
  let mut summary = SeedSummary::default();

  for &sheet in DIMENSION_SHEETS {
    let Some(range) = workbook.worksheet_range(sheet).transpose()? else {
      tracing::warn!(sheet, "workbook is missing a dimension sheet");
      continue;
    };

    let mut rows = range.rows();
    // Header row carries the column names; values are positional.
    if rows.next().is_none() {
      continue;
    }

    for (index, cells) in rows.enumerate() {
      let value = cells.first().map(cell_to_string).unwrap_or_default();
      if value.is_empty() {
        continue;
      }
      let extra = cells.get(1).map(cell_to_string).unwrap_or_default();
      seed_value(store, sheet, index, &value, &extra).await?;
      summary.values += 1;
    }
    summary.sheets += 1;
  }

  for name in ["FLS", "SLS"] {
    store.insert_scheme(name).await.map_err(Error::store)?;
  }
  for value in [
    change_type::TEMPORARY,
    change_type::SUBSTANTIVE,
    change_type::LEVEL_TRANSFER,
    change_type::DEMOTION,
  ] {
    store.insert_promotion_type(value).await.map_err(Error::store)?;
  }

  tracing::info!(
    sheets = summary.sheets,
    values = summary.values,
    "seeded lookup dimensions"
  );
  Ok(summary)
}

async fn seed_value<S: TrackerStore>(
  store: &S,
  sheet: &str,
  row_index: usize,
  value: &str,
  extra: &str,
) -> Result<()> {
  match sheet {
    "Department" => {
      store
        .insert_organisation(value, true, false)
        .await
        .map_err(Error::store)?;
    }
    "ALB" => {
      store
        .insert_organisation(value, false, true)
        .await
        .map_err(Error::store)?;
    }
    "Gender" => {
      store.insert_gender(value).await.map_err(Error::store)?;
    }
    "Sexual Orientation" => {
      store.insert_sexuality(value).await.map_err(Error::store)?;
    }
    "Ethnicity" => {
      store
        .insert_ethnicity(value, flag_is_set(extra))
        .await
        .map_err(Error::store)?;
    }
    "Grade" => {
      let rank: i64 = extra.parse().map_err(|_| Error::InvalidField {
        row:   row_index,
        field: format!("{sheet} rank"),
      })?;
      store.insert_grade(value, rank).await.map_err(Error::store)?;
    }
    "Profession" => {
      store.insert_profession(value).await.map_err(Error::store)?;
    }
    "Location" => {
      let tag = LocationTag::from_str(extra).ok();
      if tag.is_none() && !extra.is_empty() {
        tracing::warn!(value, tag = extra, "unrecognised location tag");
      }
      store.insert_location(value, tag).await.map_err(Error::store)?;
    }
    "Age" => {
      store.insert_age_range(value).await.map_err(Error::store)?;
    }
    "ReligionBelief" => {
      store.insert_belief(value).await.map_err(Error::store)?;
    }
    "Work Pattern" => {
      store.insert_working_pattern(value).await.map_err(Error::store)?;
    }
    "main job type" => {
      store
        .insert_main_job_type(value, flag_is_set(extra))
        .await
        .map_err(Error::store)?;
    }
    other => tracing::warn!(sheet = other, "no seeder for sheet"),
  }
  Ok(())
}

/// Spreadsheet truthiness: the flag columns arrive as 1/0, TRUE/FALSE, or
/// Yes/No depending on who last edited the workbook.
fn flag_is_set(cell: &str) -> bool {
  matches!(cell, "1" | "true" | "True" | "TRUE" | "Yes" | "yes")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flag_parsing_accepts_spreadsheet_truthiness() {
    for truthy in ["1", "true", "TRUE", "Yes"] {
      assert!(flag_is_set(truthy), "{truthy:?}");
    }
    for falsy in ["", "0", "false", "No", "N/A"] {
      assert!(!flag_is_set(falsy), "{falsy:?}");
    }
  }
}
