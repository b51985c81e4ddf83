//! Joining the intake roster with the application-outcomes extract.

use std::collections::HashMap;

use crate::{columns::ColumnMap, source::Row};

/// An intake row paired with its matched application row.
#[derive(Debug, Clone)]
pub struct JoinedRow {
  pub intake:      Row,
  pub application: Row,
}

/// Left-join intake rows to application rows on the personnel identifier,
/// keeping only rows whose outcome status is the configured success value.
///
/// Intake rows with no matching application row, and matched rows with any
/// other status (rejected, withdrawn before assessment, …), are dropped.
pub fn join_rows(
  intake: Vec<Row>,
  application: Vec<Row>,
  columns: &ColumnMap,
) -> Vec<JoinedRow> {
  let by_person: HashMap<String, Row> = application
    .into_iter()
    .map(|row| (row.get(&columns.join.application_key).to_string(), row))
    .collect();

  let total = intake.len();
  let joined: Vec<JoinedRow> = intake
    .into_iter()
    .filter_map(|row| {
      let key = row.get(&columns.join.intake_key);
      let application = by_person.get(key)?;
      if application.get(&columns.join.status) != columns.join.successful_status
      {
        return None;
      }
      Some(JoinedRow { intake: row, application: application.clone() })
    })
    .collect();

  tracing::info!(
    total,
    successful = joined.len(),
    dropped = total - joined.len(),
    "joined intake and application extracts"
  );
  joined
}

#[cfg(test)]
mod tests {
  use super::*;

  fn intake_row(username: &str) -> Row {
    Row::from_pairs([("Psych. Username", username), ("First Name", "James")])
  }

  fn application_row(per_id: &str, status: &str) -> Row {
    Row::from_pairs([("PerID", per_id), ("Status", status)])
  }

  #[test]
  fn keeps_only_successful_matches() {
    let intake = vec![intake_row("PU007"), intake_row("PU008"), intake_row("PU009")];
    let application = vec![
      application_row("PU007", "Successful"),
      application_row("PU008", "Unsuccessful"),
      // PU009 has no application row at all.
    ];

    let joined = join_rows(intake, application, &ColumnMap::default());
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].intake.get("Psych. Username"), "PU007");
    assert_eq!(joined[0].application.get("Status"), "Successful");
  }

  #[test]
  fn join_is_empty_when_nothing_matches() {
    let joined = join_rows(
      vec![intake_row("PU001")],
      vec![application_row("PU999", "Successful")],
      &ColumnMap::default(),
    );
    assert!(joined.is_empty());
  }
}
