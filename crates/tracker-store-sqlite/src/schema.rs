//! SQL schema for the talent-tracker SQLite store.
//!
//! Executed once at connection startup; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Lookup dimensions ───────────────────────────────────────────────────
-- Reference data, seeded before any candidate row exists. Values are never
-- updated; ingestion only ever inserts (organisations only).

CREATE TABLE IF NOT EXISTS grades (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE,
    rank  INTEGER NOT NULL          -- lower rank = more senior
);

CREATE TABLE IF NOT EXISTS organisations (
    id                     INTEGER PRIMARY KEY,
    name                   TEXT NOT NULL UNIQUE,
    parent_organisation_id INTEGER REFERENCES organisations(id),
    department             INTEGER NOT NULL DEFAULT 0,
    arms_length_body       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS professions (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS locations (
    id           INTEGER PRIMARY KEY,
    value        TEXT NOT NULL UNIQUE,
    location_tag TEXT               -- 'london' | 'region' | 'overseas' | 'devolved'
);

CREATE TABLE IF NOT EXISTS ethnicities (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE,
    bame  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS genders (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS sexualities (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS beliefs (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS working_patterns (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS age_ranges (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS main_job_types (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE,
    lower_socio_economic_background INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS schemes (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS promotion_types (
    id    INTEGER PRIMARY KEY,
    value TEXT NOT NULL UNIQUE     -- 'temporary' | 'substantive' | 'level transfer' | 'demotion'
);

-- ── Candidates ──────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS candidates (
    id                         INTEGER PRIMARY KEY,
    first_name                 TEXT NOT NULL,
    last_name                  TEXT NOT NULL,
    primary_email              TEXT NOT NULL UNIQUE,
    secondary_email            TEXT UNIQUE,
    joining_date               TEXT NOT NULL,    -- ISO 8601 date
    completed_fast_stream      INTEGER NOT NULL DEFAULT 0,
    caring_responsibility      INTEGER,          -- NULL = prefer not to say
    long_term_health_condition INTEGER,
    joining_grade_id           INTEGER REFERENCES grades(id),
    age_range_id               INTEGER REFERENCES age_ranges(id),
    working_pattern_id         INTEGER REFERENCES working_patterns(id),
    belief_id                  INTEGER REFERENCES beliefs(id),
    sexuality_id               INTEGER REFERENCES sexualities(id),
    gender_id                  INTEGER REFERENCES genders(id),
    ethnicity_id               INTEGER REFERENCES ethnicities(id),
    main_job_type_id           INTEGER REFERENCES main_job_types(id)
);

-- ── Role history ────────────────────────────────────────────────────────
-- Roles are immutable snapshots; no UPDATE is ever issued against this
-- table. Each role (including the first) is linked by exactly one change
-- event; the latest event per candidate names the current role.

CREATE TABLE IF NOT EXISTS roles (
    id              INTEGER PRIMARY KEY,
    candidate_id    INTEGER NOT NULL REFERENCES candidates(id),
    date_started    TEXT NOT NULL,
    title           TEXT NOT NULL,
    organisation_id INTEGER REFERENCES organisations(id),
    profession_id   INTEGER REFERENCES professions(id),
    location_id     INTEGER REFERENCES locations(id),
    grade_id        INTEGER NOT NULL REFERENCES grades(id),
    change_type_id  INTEGER NOT NULL REFERENCES promotion_types(id)
);

CREATE TABLE IF NOT EXISTS role_change_events (
    id             INTEGER PRIMARY KEY,
    candidate_id   INTEGER NOT NULL REFERENCES candidates(id),
    change_date    TEXT NOT NULL,
    former_role_id INTEGER REFERENCES roles(id),   -- NULL for a first role
    new_role_id    INTEGER NOT NULL UNIQUE REFERENCES roles(id),
    change_type_id INTEGER NOT NULL REFERENCES promotion_types(id)
);

-- ── Applications ────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS applications (
    id                    INTEGER PRIMARY KEY,
    candidate_id          INTEGER NOT NULL REFERENCES candidates(id),
    scheme_id             INTEGER NOT NULL REFERENCES schemes(id),
    application_date      TEXT NOT NULL,
    scheme_start_date     TEXT NOT NULL,
    aspirational_grade_id INTEGER REFERENCES grades(id),
    employee_number       TEXT,
    successful            INTEGER NOT NULL DEFAULT 0,
    meta                  INTEGER NOT NULL DEFAULT 0,
    delta                 INTEGER NOT NULL DEFAULT 0,
    cohort                INTEGER,
    withdrawn             INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS leadership_surveys (
    id               INTEGER PRIMARY KEY,
    application_id   INTEGER NOT NULL REFERENCES applications(id),
    survey_kind      TEXT NOT NULL,     -- 'fls' | 'sls'
    confident_leader INTEGER NOT NULL,
    inspiring_leader INTEGER NOT NULL,
    when_new_role    TEXT NOT NULL,
    confidence_built INTEGER NOT NULL,
    detail_json      TEXT NOT NULL      -- kind-specific payload
);

-- ── Audit log (append-only) ─────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS audit_events (
    id          INTEGER PRIMARY KEY,
    user        TEXT NOT NULL,
    action      TEXT NOT NULL,
    recorded_at TEXT NOT NULL            -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS roles_candidate_idx        ON roles(candidate_id);
CREATE INDEX IF NOT EXISTS events_candidate_idx       ON role_change_events(candidate_id);
CREATE INDEX IF NOT EXISTS events_date_idx            ON role_change_events(change_date);
CREATE INDEX IF NOT EXISTS applications_candidate_idx ON applications(candidate_id);
CREATE INDEX IF NOT EXISTS locations_tag_idx          ON locations(location_tag);

PRAGMA user_version = 1;
";
