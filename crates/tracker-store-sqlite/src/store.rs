//! [`SqliteStore`] — the SQLite implementation of [`TrackerStore`].
//!
//! Every multi-statement write (role + change event, wizard submission,
//! ingestion batch) runs inside one transaction on the store's single
//! connection, so a role is never visible without its event and a failed
//! batch leaves nothing behind.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tracker_core::{
  application::{
    Application, LeadershipSurvey, NewApplication, NewLeadershipSurvey,
  },
  audit::AuditEvent,
  candidate::{Candidate, EmailUpdate, NewCandidate},
  lookup::{
    AgeRange, Belief, DimensionValue, Ethnicity, Gender, Grade, Location,
    LocationTag, MainJobType, Organisation, OrganisationRequest, Profession,
    PromotionType, ReportDimension, Scheme, Sexuality, WorkingPattern,
    change_type,
  },
  role::{NewRole, Role, RoleChangeEvent},
  store::{CandidateBundle, IngestSummary, LookupSets, TrackerStore},
};

use crate::{
  Error, Result,
  encode::{
    RawApplication, RawAuditEvent, RawCandidate, RawEvent, RawRole, RawSurvey,
    decode_location_tag, encode_date, encode_dt, encode_location_tag,
    encode_survey_detail,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A talent-tracker store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────
// Free functions over `&rusqlite::Connection` so they compose inside the
// same transaction (a `Transaction` derefs to a `Connection`).

fn candidate_exists(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM candidates WHERE id = ?1",
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// The current role's `(role_id, change_date)` — the latest change event by
/// `(change_date, id)`.
fn latest_event(
  conn: &rusqlite::Connection,
  candidate_id: i64,
) -> rusqlite::Result<Option<(i64, String)>> {
  conn
    .query_row(
      "SELECT new_role_id, change_date FROM role_change_events
       WHERE candidate_id = ?1
       ORDER BY change_date DESC, id DESC
       LIMIT 1",
      rusqlite::params![candidate_id],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Insert a role snapshot plus its linking change event.
/// Returns `(role_id, event_id, former_role_id)`.
fn insert_role_with_event(
  conn: &rusqlite::Connection,
  candidate_id: i64,
  role: &NewRole,
) -> rusqlite::Result<(i64, i64, Option<i64>)> {
  let date_str = encode_date(role.date_started);

  let former = latest_event(conn, candidate_id)?;
  if let Some((_, ref current_date)) = former
    && date_str.as_str() < current_date.as_str()
  {
    // Not enforced (callers are responsible for supplying dates in order),
    // but out-of-order inserts corrupt "current role" derivation.
    tracing::warn!(
      candidate_id,
      new_start = %date_str,
      current_start = %current_date,
      "new role starts before the current role"
    );
  }

  conn.execute(
    "INSERT INTO roles (candidate_id, date_started, title, organisation_id,
       profession_id, location_id, grade_id, change_type_id)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      candidate_id,
      date_str,
      role.title,
      role.organisation_id,
      role.profession_id,
      role.location_id,
      role.grade_id,
      role.change_type_id,
    ],
  )?;
  let role_id = conn.last_insert_rowid();

  let former_role_id = former.map(|(id, _)| id);
  conn.execute(
    "INSERT INTO role_change_events (candidate_id, change_date,
       former_role_id, new_role_id, change_type_id)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      candidate_id,
      date_str,
      former_role_id,
      role_id,
      role.change_type_id,
    ],
  )?;
  let event_id = conn.last_insert_rowid();

  Ok((role_id, event_id, former_role_id))
}

fn get_organisation_by_name(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<Option<Organisation>> {
  conn
    .query_row(
      "SELECT id, name, parent_organisation_id, department, arms_length_body
       FROM organisations WHERE name = ?1",
      rusqlite::params![name],
      organisation_from_row,
    )
    .optional()
}

fn organisation_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Organisation> {
  Ok(Organisation {
    id:                     row.get(0)?,
    name:                   row.get(1)?,
    parent_organisation_id: row.get(2)?,
    department:             row.get(3)?,
    arms_length_body:       row.get(4)?,
  })
}

/// Look up or create the department and (optionally) its ALB, parent-linking
/// the ALB to the department. Returns the organisation the candidate belongs
/// to and how many rows were created.
fn ensure_organisation_tx(
  conn: &rusqlite::Connection,
  request: &OrganisationRequest,
) -> rusqlite::Result<(Organisation, usize)> {
  let mut created = 0;

  let department = match get_organisation_by_name(conn, &request.department)? {
    Some(org) => org,
    None => {
      conn.execute(
        "INSERT INTO organisations (name, department) VALUES (?1, 1)",
        rusqlite::params![request.department],
      )?;
      created += 1;
      tracing::info!(name = %request.department, "created department organisation");
      Organisation {
        id:                     conn.last_insert_rowid(),
        name:                   request.department.clone(),
        parent_organisation_id: None,
        department:             true,
        arms_length_body:       false,
      }
    }
  };

  let Some(alb_name) = request.arms_length_body.as_deref() else {
    return Ok((department, created));
  };

  if get_organisation_by_name(conn, alb_name)?.is_none() {
    conn.execute(
      "INSERT INTO organisations (name, arms_length_body) VALUES (?1, 1)",
      rusqlite::params![alb_name],
    )?;
    created += 1;
    tracing::info!(name = %alb_name, "created arms-length-body organisation");
  }
  conn.execute(
    "UPDATE organisations SET parent_organisation_id = ?1 WHERE name = ?2",
    rusqlite::params![department.id, alb_name],
  )?;

  let alb = get_organisation_by_name(conn, alb_name)?
    .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
  Ok((alb, created))
}

fn insert_candidate_tx(
  conn: &rusqlite::Connection,
  input: &NewCandidate,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO candidates (first_name, last_name, primary_email,
       secondary_email, joining_date, completed_fast_stream,
       caring_responsibility, long_term_health_condition, joining_grade_id,
       age_range_id, working_pattern_id, belief_id, sexuality_id, gender_id,
       ethnicity_id, main_job_type_id)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
       ?15, ?16)",
    rusqlite::params![
      input.first_name,
      input.last_name,
      input.primary_email,
      input.secondary_email,
      encode_date(input.joining_date),
      input.completed_fast_stream,
      input.caring_responsibility,
      input.long_term_health_condition,
      input.joining_grade_id,
      input.age_range_id,
      input.working_pattern_id,
      input.belief_id,
      input.sexuality_id,
      input.gender_id,
      input.ethnicity_id,
      input.main_job_type_id,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn insert_application_tx(
  conn: &rusqlite::Connection,
  candidate_id: i64,
  input: &NewApplication,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO applications (candidate_id, scheme_id, application_date,
       scheme_start_date, aspirational_grade_id, employee_number, successful,
       meta, delta, cohort)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    rusqlite::params![
      candidate_id,
      input.scheme_id,
      encode_date(input.application_date),
      encode_date(input.scheme_start_date),
      input.aspirational_grade_id,
      input.employee_number,
      input.successful,
      input.meta,
      input.delta,
      input.cohort,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn apply_email_update(
  conn: &rusqlite::Connection,
  candidate_id: i64,
  update: &EmailUpdate,
) -> rusqlite::Result<usize> {
  let sql = if update.primary {
    "UPDATE candidates SET primary_email = ?1 WHERE id = ?2"
  } else {
    "UPDATE candidates SET secondary_email = ?1 WHERE id = ?2"
  };
  conn.execute(sql, rusqlite::params![update.address, candidate_id])
}

/// Lookup table name for a report dimension.
fn dimension_table(dimension: ReportDimension) -> &'static str {
  match dimension {
    ReportDimension::Ethnicity => "ethnicities",
    ReportDimension::Gender => "genders",
    ReportDimension::Sexuality => "sexualities",
    ReportDimension::Belief => "beliefs",
    ReportDimension::WorkingPattern => "working_patterns",
    ReportDimension::AgeRange => "age_ranges",
    ReportDimension::MainJobType => "main_job_types",
  }
}

/// Candidate reference column for a report dimension.
fn dimension_column(dimension: ReportDimension) -> &'static str {
  match dimension {
    ReportDimension::Ethnicity => "ethnicity_id",
    ReportDimension::Gender => "gender_id",
    ReportDimension::Sexuality => "sexuality_id",
    ReportDimension::Belief => "belief_id",
    ReportDimension::WorkingPattern => "working_pattern_id",
    ReportDimension::AgeRange => "age_range_id",
    ReportDimension::MainJobType => "main_job_type_id",
  }
}

fn list_values(
  conn: &rusqlite::Connection,
  table: &str,
) -> rusqlite::Result<Vec<(i64, String)>> {
  let mut stmt =
    conn.prepare(&format!("SELECT id, value FROM {table} ORDER BY id"))?;
  let rows = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Insert-if-absent on a `(value)`-unique lookup table, returning the row id.
fn upsert_value(
  conn: &rusqlite::Connection,
  table: &str,
  value: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    &format!("INSERT INTO {table} (value) VALUES (?1) ON CONFLICT(value) DO NOTHING"),
    rusqlite::params![value],
  )?;
  conn.query_row(
    &format!("SELECT id FROM {table} WHERE value = ?1"),
    rusqlite::params![value],
    |row| row.get(0),
  )
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = Error;

  // ── Lookup dimensions ─────────────────────────────────────────────────────

  async fn lookup_sets(&self) -> Result<LookupSets> {
    self
      .conn
      .call(|conn| {
        let grades = conn
          .prepare("SELECT id, value, rank FROM grades ORDER BY id")?
          .query_map([], |row| {
            Ok(Grade { id: row.get(0)?, value: row.get(1)?, rank: row.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let professions = conn
          .prepare("SELECT id, value FROM professions ORDER BY id")?
          .query_map([], |row| {
            Ok(Profession { id: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let locations = conn
          .prepare("SELECT id, value, location_tag FROM locations ORDER BY id")?
          .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let ethnicities = conn
          .prepare("SELECT id, value, bame FROM ethnicities ORDER BY id")?
          .query_map([], |row| {
            Ok(Ethnicity { id: row.get(0)?, value: row.get(1)?, bame: row.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let genders = conn
          .prepare("SELECT id, value FROM genders ORDER BY id")?
          .query_map([], |row| Ok(Gender { id: row.get(0)?, value: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let sexualities = conn
          .prepare("SELECT id, value FROM sexualities ORDER BY id")?
          .query_map([], |row| {
            Ok(Sexuality { id: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let beliefs = conn
          .prepare("SELECT id, value FROM beliefs ORDER BY id")?
          .query_map([], |row| Ok(Belief { id: row.get(0)?, value: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let working_patterns = conn
          .prepare("SELECT id, value FROM working_patterns ORDER BY id")?
          .query_map([], |row| {
            Ok(WorkingPattern { id: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let age_ranges = conn
          .prepare("SELECT id, value FROM age_ranges ORDER BY id")?
          .query_map([], |row| {
            Ok(AgeRange { id: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let main_job_types = conn
          .prepare(
            "SELECT id, value, lower_socio_economic_background
             FROM main_job_types ORDER BY id",
          )?
          .query_map([], |row| {
            Ok(MainJobType {
              id:    row.get(0)?,
              value: row.get(1)?,
              lower_socio_economic_background: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let schemes = conn
          .prepare("SELECT id, name FROM schemes ORDER BY id")?
          .query_map([], |row| Ok(Scheme { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let promotion_types = conn
          .prepare("SELECT id, value FROM promotion_types ORDER BY id")?
          .query_map([], |row| {
            Ok(PromotionType { id: row.get(0)?, value: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((
          grades,
          professions,
          locations,
          ethnicities,
          genders,
          sexualities,
          beliefs,
          working_patterns,
          age_ranges,
          main_job_types,
          schemes,
          promotion_types,
        ))
      })
      .await
      .map_err(Error::from)
      .and_then(
        |(
          grades,
          professions,
          locations,
          ethnicities,
          genders,
          sexualities,
          beliefs,
          working_patterns,
          age_ranges,
          main_job_types,
          schemes,
          promotion_types,
        )| {
          let locations = locations
            .into_iter()
            .map(|(id, value, tag)| {
              let tag = tag.as_deref().map(decode_location_tag).transpose()?;
              Ok(Location { id, value, tag })
            })
            .collect::<Result<Vec<_>>>()?;
          Ok(LookupSets {
            grades,
            professions,
            locations,
            ethnicities,
            genders,
            sexualities,
            beliefs,
            working_patterns,
            age_ranges,
            main_job_types,
            schemes,
            promotion_types,
          })
        },
      )
  }

  async fn list_grades(&self) -> Result<Vec<Grade>> {
    let grades = self
      .conn
      .call(|conn| {
        let rows = conn
          .prepare("SELECT id, value, rank FROM grades ORDER BY rank ASC")?
          .query_map([], |row| {
            Ok(Grade { id: row.get(0)?, value: row.get(1)?, rank: row.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(grades)
  }

  async fn find_scheme_by_name(&self, name: &str) -> Result<Option<Scheme>> {
    let name = name.to_owned();
    let scheme = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name FROM schemes WHERE name = ?1",
              rusqlite::params![name],
              |row| Ok(Scheme { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(scheme)
  }

  async fn find_organisation_by_name(
    &self,
    name: &str,
  ) -> Result<Option<Organisation>> {
    let name = name.to_owned();
    let org = self
      .conn
      .call(move |conn| Ok(get_organisation_by_name(conn, &name)?))
      .await?;
    Ok(org)
  }

  async fn ensure_organisation(
    &self,
    request: OrganisationRequest,
  ) -> Result<Organisation> {
    let (org, _created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let result = ensure_organisation_tx(&tx, &request)?;
        tx.commit()?;
        Ok(result)
      })
      .await?;
    Ok(org)
  }

  async fn list_dimension_values(
    &self,
    dimension: ReportDimension,
  ) -> Result<Vec<DimensionValue>> {
    let table = dimension_table(dimension);
    let values = self
      .conn
      .call(move |conn| Ok(list_values(conn, table)?))
      .await?;
    Ok(
      values
        .into_iter()
        .map(|(id, value)| DimensionValue { id, value })
        .collect(),
    )
  }

  async fn candidates_with(
    &self,
    dimension: ReportDimension,
    value_id: i64,
  ) -> Result<Vec<i64>> {
    let column = dimension_column(dimension);
    let ids = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT id FROM candidates WHERE {column} = ?1 ORDER BY id"
          ))?
          .query_map(rusqlite::params![value_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids)
  }

  // ── Lookup seeding ────────────────────────────────────────────────────────

  async fn insert_grade(&self, value: &str, rank: i64) -> Result<Grade> {
    let value = value.to_owned();
    let grade = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO grades (value, rank) VALUES (?1, ?2)
           ON CONFLICT(value) DO NOTHING",
          rusqlite::params![value, rank],
        )?;
        Ok(conn.query_row(
          "SELECT id, value, rank FROM grades WHERE value = ?1",
          rusqlite::params![value],
          |row| {
            Ok(Grade { id: row.get(0)?, value: row.get(1)?, rank: row.get(2)? })
          },
        )?)
      })
      .await?;
    Ok(grade)
  }

  async fn insert_organisation(
    &self,
    name: &str,
    department: bool,
    arms_length_body: bool,
  ) -> Result<Organisation> {
    let name = name.to_owned();
    let org = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organisations (name, department, arms_length_body)
           VALUES (?1, ?2, ?3) ON CONFLICT(name) DO NOTHING",
          rusqlite::params![name, department, arms_length_body],
        )?;
        Ok(
          get_organisation_by_name(conn, &name)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?,
        )
      })
      .await?;
    Ok(org)
  }

  async fn insert_profession(&self, value: &str) -> Result<Profession> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "professions", &value)?;
        Ok(Profession { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_location(
    &self,
    value: &str,
    tag: Option<LocationTag>,
  ) -> Result<Location> {
    let value = value.to_owned();
    let location = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (value, location_tag) VALUES (?1, ?2)
           ON CONFLICT(value) DO NOTHING",
          rusqlite::params![value, tag.map(encode_location_tag)],
        )?;
        let id = conn.query_row(
          "SELECT id FROM locations WHERE value = ?1",
          rusqlite::params![value],
          |row| row.get(0),
        )?;
        Ok(Location { id, value, tag })
      })
      .await?;
    Ok(location)
  }

  async fn insert_ethnicity(&self, value: &str, bame: bool) -> Result<Ethnicity> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ethnicities (value, bame) VALUES (?1, ?2)
           ON CONFLICT(value) DO NOTHING",
          rusqlite::params![value, bame],
        )?;
        Ok(conn.query_row(
          "SELECT id, value, bame FROM ethnicities WHERE value = ?1",
          rusqlite::params![value],
          |row| {
            Ok(Ethnicity { id: row.get(0)?, value: row.get(1)?, bame: row.get(2)? })
          },
        )?)
      })
      .await?;
    Ok(row)
  }

  async fn insert_gender(&self, value: &str) -> Result<Gender> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "genders", &value)?;
        Ok(Gender { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_sexuality(&self, value: &str) -> Result<Sexuality> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "sexualities", &value)?;
        Ok(Sexuality { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_belief(&self, value: &str) -> Result<Belief> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "beliefs", &value)?;
        Ok(Belief { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_working_pattern(&self, value: &str) -> Result<WorkingPattern> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "working_patterns", &value)?;
        Ok(WorkingPattern { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_age_range(&self, value: &str) -> Result<AgeRange> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "age_ranges", &value)?;
        Ok(AgeRange { id, value })
      })
      .await?;
    Ok(row)
  }

  async fn insert_main_job_type(
    &self,
    value: &str,
    lower_socio_economic_background: bool,
  ) -> Result<MainJobType> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO main_job_types (value, lower_socio_economic_background)
           VALUES (?1, ?2) ON CONFLICT(value) DO NOTHING",
          rusqlite::params![value, lower_socio_economic_background],
        )?;
        Ok(conn.query_row(
          "SELECT id, value, lower_socio_economic_background
           FROM main_job_types WHERE value = ?1",
          rusqlite::params![value],
          |row| {
            Ok(MainJobType {
              id:    row.get(0)?,
              value: row.get(1)?,
              lower_socio_economic_background: row.get(2)?,
            })
          },
        )?)
      })
      .await?;
    Ok(row)
  }

  async fn insert_scheme(&self, name: &str) -> Result<Scheme> {
    let name = name.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schemes (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
          rusqlite::params![name],
        )?;
        let id = conn.query_row(
          "SELECT id FROM schemes WHERE name = ?1",
          rusqlite::params![name],
          |row| row.get(0),
        )?;
        Ok(Scheme { id, name })
      })
      .await?;
    Ok(row)
  }

  async fn insert_promotion_type(&self, value: &str) -> Result<PromotionType> {
    let value = value.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        let id = upsert_value(conn, "promotion_types", &value)?;
        Ok(PromotionType { id, value })
      })
      .await?;
    Ok(row)
  }

  // ── Candidates ────────────────────────────────────────────────────────────

  async fn create_candidate(&self, input: NewCandidate) -> Result<Candidate> {
    let raw = self
      .conn
      .call(move |conn| {
        let id = insert_candidate_tx(conn, &input)?;
        Ok(conn.query_row(
          &format!(
            "SELECT {} FROM candidates WHERE id = ?1",
            RawCandidate::COLUMNS
          ),
          rusqlite::params![id],
          RawCandidate::from_row,
        )?)
      })
      .await?;
    raw.into_candidate()
  }

  async fn get_candidate(&self, id: i64) -> Result<Option<Candidate>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM candidates WHERE id = ?1",
                RawCandidate::COLUMNS
              ),
              rusqlite::params![id],
              RawCandidate::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn find_candidate_by_email(
    &self,
    address: &str,
  ) -> Result<Option<Candidate>> {
    let address = address.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM candidates
                 WHERE primary_email = ?1 OR secondary_email = ?1",
                RawCandidate::COLUMNS
              ),
              rusqlite::params![address],
              RawCandidate::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn update_email(
    &self,
    candidate_id: i64,
    update: EmailUpdate,
  ) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| Ok(apply_email_update(conn, candidate_id, &update)?))
      .await?;
    if updated == 0 {
      return Err(Error::CandidateNotFound(candidate_id));
    }
    Ok(())
  }

  async fn update_name(
    &self,
    candidate_id: i64,
    first_name: &str,
    last_name: &str,
  ) -> Result<()> {
    let first = first_name.to_owned();
    let last = last_name.to_owned();
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE candidates SET first_name = ?1, last_name = ?2 WHERE id = ?3",
          rusqlite::params![first, last, candidate_id],
        )?)
      })
      .await?;
    if updated == 0 {
      return Err(Error::CandidateNotFound(candidate_id));
    }
    Ok(())
  }

  // ── Role history ──────────────────────────────────────────────────────────

  async fn new_role(
    &self,
    candidate_id: i64,
    input: NewRole,
  ) -> Result<(Role, RoleChangeEvent)> {
    self.submit_role_update(candidate_id, input, None).await
  }

  async fn submit_role_update(
    &self,
    candidate_id: i64,
    role: NewRole,
    email: Option<EmailUpdate>,
  ) -> Result<(Role, RoleChangeEvent)> {
    let input = role.clone();
    let ids = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !candidate_exists(&tx, candidate_id)? {
          return Ok(None);
        }
        let (role_id, event_id, former_role_id) =
          insert_role_with_event(&tx, candidate_id, &input)?;
        if let Some(update) = &email {
          apply_email_update(&tx, candidate_id, update)?;
        }
        tx.commit()?;
        Ok(Some((role_id, event_id, former_role_id)))
      })
      .await?;

    let (role_id, event_id, former_role_id) =
      ids.ok_or(Error::CandidateNotFound(candidate_id))?;

    let stored_role = Role {
      id: role_id,
      candidate_id,
      date_started: role.date_started,
      title: role.title,
      organisation_id: role.organisation_id,
      profession_id: role.profession_id,
      location_id: role.location_id,
      grade_id: role.grade_id,
      change_type_id: role.change_type_id,
    };
    let event = RoleChangeEvent {
      id: event_id,
      candidate_id,
      change_date: stored_role.date_started,
      former_role_id,
      new_role_id: role_id,
      change_type_id: stored_role.change_type_id,
    };
    Ok((stored_role, event))
  }

  async fn current_role(&self, candidate_id: i64) -> Result<Option<Role>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT r.id, r.candidate_id, r.date_started, r.title,
                 r.organisation_id, r.profession_id, r.location_id,
                 r.grade_id, r.change_type_id
               FROM roles r
               JOIN role_change_events e ON e.new_role_id = r.id
               WHERE e.candidate_id = ?1
               ORDER BY e.change_date DESC, e.id DESC
               LIMIT 1",
              rusqlite::params![candidate_id],
              RawRole::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawRole::into_role).transpose()
  }

  async fn current_grade(&self, candidate_id: i64) -> Result<Option<Grade>> {
    let grade = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT g.id, g.value, g.rank FROM grades g
               JOIN roles r ON r.grade_id = g.id
               JOIN role_change_events e ON e.new_role_id = r.id
               WHERE e.candidate_id = ?1
               ORDER BY e.change_date DESC, e.id DESC
               LIMIT 1",
              rusqlite::params![candidate_id],
              |row| {
                Ok(Grade {
                  id:    row.get(0)?,
                  value: row.get(1)?,
                  rank:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(grade)
  }

  async fn current_location(
    &self,
    candidate_id: i64,
  ) -> Result<Option<Location>> {
    // Pinned to the latest change event: a current role with no location is
    // None, not an older role's location.
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT l.id, l.value, l.location_tag
               FROM role_change_events e
               JOIN roles r ON r.id = e.new_role_id
               LEFT JOIN locations l ON l.id = r.location_id
               WHERE e.candidate_id = ?1
               ORDER BY e.change_date DESC, e.id DESC
               LIMIT 1",
              rusqlite::params![candidate_id],
              |row| {
                Ok((
                  row.get::<_, Option<i64>>(0)?,
                  row.get::<_, Option<String>>(1)?,
                  row.get::<_, Option<String>>(2)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some((Some(id), Some(value), tag)) = raw else {
      return Ok(None);
    };
    let tag = tag.as_deref().map(decode_location_tag).transpose()?;
    Ok(Some(Location { id, value, tag }))
  }

  async fn role_history(&self, candidate_id: i64) -> Result<Vec<Role>> {
    let raws = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {} FROM roles WHERE candidate_id = ?1
             ORDER BY date_started DESC, id DESC",
            RawRole::COLUMNS
          ))?
          .query_map(rusqlite::params![candidate_id], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn roles_since(
    &self,
    candidate_id: i64,
    since: NaiveDate,
  ) -> Result<Vec<Role>> {
    let since_str = encode_date(since);
    let raws = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {} FROM roles
             WHERE candidate_id = ?1 AND date_started >= ?2
             ORDER BY date_started DESC, id DESC",
            RawRole::COLUMNS
          ))?
          .query_map(rusqlite::params![candidate_id, since_str], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn role_change_events(
    &self,
    candidate_id: i64,
  ) -> Result<Vec<RoleChangeEvent>> {
    let raws = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {} FROM role_change_events WHERE candidate_id = ?1
             ORDER BY change_date DESC, id DESC",
            RawEvent::COLUMNS
          ))?
          .query_map(rusqlite::params![candidate_id], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn is_promotion(&self, role_id: i64) -> Result<bool> {
    let verdict = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM roles WHERE id = ?1",
            rusqlite::params![role_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        // Compare against the former role named by this role's change event;
        // a first role has no former role to out-rank.
        let promoted: Option<bool> = conn
          .query_row(
            "SELECT ng.rank < fg.rank
             FROM role_change_events e
             JOIN roles nr ON nr.id = e.new_role_id
             JOIN grades ng ON ng.id = nr.grade_id
             JOIN roles fr ON fr.id = e.former_role_id
             JOIN grades fg ON fg.id = fr.grade_id
             WHERE e.new_role_id = ?1",
            rusqlite::params![role_id],
            |row| row.get(0),
          )
          .optional()?;
        Ok(Some(promoted.unwrap_or(false)))
      })
      .await?;
    verdict.ok_or(Error::RoleNotFound(role_id))
  }

  async fn promoted_between(
    &self,
    candidate_id: i64,
    after: NaiveDate,
    before: Option<NaiveDate>,
    temporary: bool,
  ) -> Result<bool> {
    let before = before.unwrap_or_else(|| Utc::now().date_naive());
    if after > before {
      return Ok(false);
    }

    let kind = if temporary {
      change_type::TEMPORARY
    } else {
      change_type::SUBSTANTIVE
    };
    let after_str = encode_date(after);
    let before_str = encode_date(before);

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM role_change_events e
               JOIN promotion_types p ON p.id = e.change_type_id
               WHERE e.candidate_id = ?1
                 AND p.value = ?2
                 AND e.change_date >= ?3
                 AND e.change_date <= ?4
               LIMIT 1",
              rusqlite::params![candidate_id, kind, after_str, before_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn record_application(
    &self,
    candidate_id: i64,
    input: NewApplication,
  ) -> Result<Application> {
    let raw = self
      .conn
      .call(move |conn| {
        if !candidate_exists(conn, candidate_id)? {
          return Ok(None);
        }
        let id = insert_application_tx(conn, candidate_id, &input)?;
        Ok(Some(conn.query_row(
          &format!(
            "SELECT {} FROM applications WHERE id = ?1",
            RawApplication::COLUMNS
          ),
          rusqlite::params![id],
          RawApplication::from_row,
        )?))
      })
      .await?;
    raw
      .ok_or(Error::CandidateNotFound(candidate_id))?
      .into_application()
  }

  async fn most_recent_application(
    &self,
    candidate_id: i64,
  ) -> Result<Option<Application>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM applications WHERE candidate_id = ?1
                 ORDER BY application_date DESC, id DESC
                 LIMIT 1",
                RawApplication::COLUMNS
              ),
              rusqlite::params![candidate_id],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawApplication::into_application).transpose()
  }

  async fn current_scheme(&self, candidate_id: i64) -> Result<Option<Scheme>> {
    let scheme = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.id, s.name FROM schemes s
               JOIN applications a ON a.scheme_id = s.id
               WHERE a.candidate_id = ?1
               ORDER BY a.application_date DESC, a.id DESC
               LIMIT 1",
              rusqlite::params![candidate_id],
              |row| Ok(Scheme { id: row.get(0)?, name: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(scheme)
  }

  async fn defer_application(
    &self,
    application_id: i64,
    new_start_date: NaiveDate,
  ) -> Result<Application> {
    let date_str = encode_date(new_start_date);
    let raw = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE applications SET scheme_start_date = ?1 WHERE id = ?2",
          rusqlite::params![date_str, application_id],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(Some(conn.query_row(
          &format!(
            "SELECT {} FROM applications WHERE id = ?1",
            RawApplication::COLUMNS
          ),
          rusqlite::params![application_id],
          RawApplication::from_row,
        )?))
      })
      .await?;
    raw
      .ok_or(Error::ApplicationNotFound(application_id))?
      .into_application()
  }

  async fn record_leadership_survey(
    &self,
    input: NewLeadershipSurvey,
  ) -> Result<LeadershipSurvey> {
    let detail_json = encode_survey_detail(&input.detail)?;
    let kind = input.detail.kind().to_string();
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leadership_surveys (application_id, survey_kind,
             confident_leader, inspiring_leader, when_new_role,
             confidence_built, detail_json)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.application_id,
            kind,
            input.confident_leader,
            input.inspiring_leader,
            input.when_new_role,
            input.confidence_built,
            detail_json,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!(
            "SELECT {} FROM leadership_surveys WHERE id = ?1",
            RawSurvey::COLUMNS
          ),
          rusqlite::params![id],
          RawSurvey::from_row,
        )?)
      })
      .await?;
    raw.into_survey()
  }

  async fn leadership_survey_for(
    &self,
    application_id: i64,
  ) -> Result<Option<LeadershipSurvey>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM leadership_surveys WHERE application_id = ?1",
                RawSurvey::COLUMNS
              ),
              rusqlite::params![application_id],
              RawSurvey::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSurvey::into_survey).transpose()
  }

  // ── Batch ingestion ───────────────────────────────────────────────────────

  async fn ingest_candidates(
    &self,
    bundles: Vec<CandidateBundle>,
  ) -> Result<IngestSummary> {
    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut summary = IngestSummary::default();

        for bundle in &bundles {
          let organisation_id = match &bundle.organisation {
            Some(request) => {
              let (org, created) = ensure_organisation_tx(&tx, request)?;
              summary.organisations_created += created;
              Some(org.id)
            }
            None => None,
          };

          let candidate_id = insert_candidate_tx(&tx, &bundle.candidate)?;
          insert_application_tx(&tx, candidate_id, &bundle.application)?;

          // Chronological order: the joining-date role first, then the
          // pre-programme role, so the latter ends up current.
          insert_role_with_event(&tx, candidate_id, &bundle.first_role)?;
          let mut recent = bundle.recent_role.clone();
          recent.organisation_id = organisation_id;
          insert_role_with_event(&tx, candidate_id, &recent)?;

          summary.candidates += 1;
        }

        tx.commit()?;
        Ok(summary)
      })
      .await?;

    tracing::info!(
      candidates = summary.candidates,
      organisations_created = summary.organisations_created,
      "ingestion batch committed"
    );
    Ok(summary)
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn record_audit_event(
    &self,
    user: &str,
    action: &str,
  ) -> Result<AuditEvent> {
    let user = user.to_owned();
    let action = action.to_owned();
    let recorded_at = Utc::now();
    let at_str = encode_dt(recorded_at);

    let user_param = user.clone();
    let action_param = action.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_events (user, action, recorded_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_param, action_param, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(AuditEvent { id, user, action, recorded_at })
  }

  async fn list_audit_events(&self) -> Result<Vec<AuditEvent>> {
    let raws = self
      .conn
      .call(|conn| {
        let rows = conn
          .prepare(
            "SELECT id, user, action, recorded_at FROM audit_events
             ORDER BY id",
          )?
          .query_map([], |row| {
            Ok(RawAuditEvent {
              id:          row.get(0)?,
              user:        row.get(1)?,
              action:      row.get(2)?,
              recorded_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAuditEvent::into_event).collect()
  }
}
