//! SQL schema for the Presencia SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    employee_id          TEXT PRIMARY KEY,
    employee_number      TEXT NOT NULL UNIQUE,
    name                 TEXT NOT NULL,
    general_direction_id INTEGER NOT NULL,
    direction_id         INTEGER NOT NULL,
    subdirectorate_id    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS justification_types (
    type_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL
);

-- Soft-deleted rows keep their data; deleted_at flips them invisible to
-- every read that does not opt into the audit path.
CREATE TABLE IF NOT EXISTS justifications (
    justification_id TEXT PRIMARY KEY,
    employee_id      TEXT NOT NULL REFERENCES employees(employee_id),
    type_id          INTEGER NOT NULL REFERENCES justification_types(type_id),
    date_start       TEXT NOT NULL,   -- YYYY-MM-DD
    date_finish      TEXT,            -- NULL means single-day
    file             TEXT NOT NULL,   -- file-store key of the document
    details          TEXT,
    author_user_id   TEXT NOT NULL,
    created_at       TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    deleted_at       TEXT
);

-- Incidents are reconciled (hard-deleted) when a justification covering
-- their date is created.
CREATE TABLE IF NOT EXISTS incidents (
    incident_id TEXT PRIMARY KEY,
    employee_id TEXT NOT NULL REFERENCES employees(employee_id),
    date        TEXT NOT NULL        -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS justifications_employee_idx ON justifications(employee_id);
CREATE INDEX IF NOT EXISTS justifications_created_idx  ON justifications(created_at);
CREATE INDEX IF NOT EXISTS incidents_employee_date_idx ON incidents(employee_id, date);

PRAGMA user_version = 1;
";
