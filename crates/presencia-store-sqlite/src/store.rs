//! [`SqliteStore`] — the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use presencia_core::{
  employee::{Employee, NewEmployee},
  incident::{Incident, NewIncident},
  justification::{
    Justification, JustificationType, JustificationUpdate, JustificationView,
    NewJustification, RecordState,
  },
  scope::ScopeFilter,
  store::{AttendanceStore, Visibility},
};

use crate::{
  Error, Result,
  encode::{
    RawEmployee, RawIncident, RawJustification, RawJustificationView,
    encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Columns selected for a full justification row, in `RawJustification`
/// field order.
const JUSTIFICATION_COLS: &str = "justification_id, employee_id, type_id, \
   date_start, date_finish, file, details, author_user_id, created_at, \
   deleted_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
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

fn map_justification_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJustification> {
  Ok(RawJustification {
    justification_id: row.get(0)?,
    employee_id:      row.get(1)?,
    type_id:          row.get(2)?,
    date_start:       row.get(3)?,
    date_finish:      row.get(4)?,
    file:             row.get(5)?,
    details:          row.get(6)?,
    author_user_id:   row.get(7)?,
    created_at:       row.get(8)?,
    deleted_at:       row.get(9)?,
  })
}

fn map_view_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJustificationView> {
  Ok(RawJustificationView {
    justification: map_justification_row(row)?,
    employee_name: row.get(10)?,
    type_name:     row.get(11)?,
  })
}

fn map_employee_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEmployee> {
  Ok(RawEmployee {
    employee_id:          row.get(0)?,
    employee_number:      row.get(1)?,
    name:                 row.get(2)?,
    general_direction_id: row.get(3)?,
    direction_id:         row.get(4)?,
    subdirectorate_id:    row.get(5)?,
  })
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Justification-type catalog ────────────────────────────────────────

  async fn justification_type(&self, type_id: i64) -> Result<Option<JustificationType>> {
    let row: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT type_id, name FROM justification_types WHERE type_id = ?1",
              rusqlite::params![type_id],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(row.map(|(type_id, name)| JustificationType { type_id, name }))
  }

  async fn justification_types(&self) -> Result<Vec<JustificationType>> {
    let rows: Vec<(i64, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT type_id, name FROM justification_types ORDER BY type_id")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(type_id, name)| JustificationType { type_id, name })
        .collect(),
    )
  }

  async fn add_justification_type(&self, name: &str) -> Result<JustificationType> {
    let name_owned = name.to_owned();
    let (type_id, name) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO justification_types (name) VALUES (?1)",
          rusqlite::params![name_owned],
        )?;
        Ok((conn.last_insert_rowid(), name_owned))
      })
      .await?;

    Ok(JustificationType { type_id, name })
  }

  // ── Employee directory ────────────────────────────────────────────────

  async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
    let employee = Employee {
      employee_id:          Uuid::new_v4(),
      employee_number:      input.employee_number,
      name:                 input.name,
      general_direction_id: input.general_direction_id,
      direction_id:         input.direction_id,
      subdirectorate_id:    input.subdirectorate_id,
    };

    let id_str = encode_uuid(employee.employee_id);
    let number = employee.employee_number.clone();
    let name = employee.name.clone();
    let (gd, dir, sub) = (
      employee.general_direction_id,
      employee.direction_id,
      employee.subdirectorate_id,
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (
             employee_id, employee_number, name,
             general_direction_id, direction_id, subdirectorate_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, number, name, gd, dir, sub],
        )?;
        Ok(())
      })
      .await?;

    Ok(employee)
  }

  async fn employee(&self, employee_id: Uuid) -> Result<Option<Employee>> {
    let id_str = encode_uuid(employee_id);

    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT employee_id, employee_number, name,
                      general_direction_id, direction_id, subdirectorate_id
               FROM employees WHERE employee_id = ?1",
              rusqlite::params![id_str],
              map_employee_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn employee_by_number(&self, employee_number: &str) -> Result<Option<Employee>> {
    let number = employee_number.to_owned();

    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT employee_id, employee_number, name,
                      general_direction_id, direction_id, subdirectorate_id
               FROM employees WHERE employee_number = ?1",
              rusqlite::params![number],
              map_employee_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  // ── Incident ledger ───────────────────────────────────────────────────

  async fn record_incident(&self, input: NewIncident) -> Result<Incident> {
    let incident = Incident {
      incident_id: Uuid::new_v4(),
      employee_id: input.employee_id,
      date:        input.date,
    };

    let id_str = encode_uuid(incident.incident_id);
    let emp_str = encode_uuid(incident.employee_id);
    let date_str = encode_date(incident.date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO incidents (incident_id, employee_id, date) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, emp_str, date_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(incident)
  }

  async fn incidents_for_employee(
    &self,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Incident>> {
    let emp_str = encode_uuid(employee_id);
    let start_str = encode_date(start);
    let end_str = encode_date(end);

    let raws: Vec<RawIncident> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT incident_id, employee_id, date
           FROM incidents
           WHERE employee_id = ?1 AND date >= ?2 AND date <= ?3
           ORDER BY date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![emp_str, start_str, end_str], |row| {
            Ok(RawIncident {
              incident_id: row.get(0)?,
              employee_id: row.get(1)?,
              date:        row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIncident::into_incident).collect()
  }

  // ── Justification repository ──────────────────────────────────────────

  async fn create_justification(
    &self,
    input: NewJustification,
  ) -> Result<(Justification, u64)> {
    let record = Justification {
      justification_id: Uuid::new_v4(),
      employee_id:      input.employee_id,
      type_id:          input.type_id,
      date_start:       input.date_start,
      date_finish:      input.date_finish,
      file:             input.file,
      details:          input.details,
      author_user_id:   input.author_user_id,
      created_at:       Utc::now(),
      state:            RecordState::Active,
    };

    let id_str = encode_uuid(record.justification_id);
    let emp_str = encode_uuid(record.employee_id);
    let type_id = record.type_id;
    let start_str = encode_date(record.date_start);
    let finish_str = record.date_finish.map(encode_date);
    let effective_finish_str = encode_date(record.effective_finish());
    let file = record.file.clone();
    let details = record.details.clone();
    let author_str = encode_uuid(record.author_user_id);
    let created_str = encode_dt(record.created_at);

    // The insert and the incident reconciliation commit or roll back
    // together.
    let reconciled: u64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO justifications (
             justification_id, employee_id, type_id, date_start, date_finish,
             file, details, author_user_id, created_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL)",
          rusqlite::params![
            id_str,
            emp_str,
            type_id,
            start_str,
            finish_str,
            file,
            details,
            author_str,
            created_str,
          ],
        )?;

        let deleted = tx.execute(
          "DELETE FROM incidents
           WHERE employee_id = ?1 AND date >= ?2 AND date <= ?3",
          rusqlite::params![emp_str, start_str, effective_finish_str],
        )?;

        tx.commit()?;
        Ok(deleted as u64)
      })
      .await?;

    Ok((record, reconciled))
  }

  async fn justification(
    &self,
    justification_id: Uuid,
    visibility: Visibility,
  ) -> Result<Option<Justification>> {
    let id_str = encode_uuid(justification_id);
    let active_only = matches!(visibility, Visibility::ActiveOnly);

    let raw: Option<RawJustification> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {JUSTIFICATION_COLS} FROM justifications
           WHERE justification_id = ?1{}",
          if active_only { " AND deleted_at IS NULL" } else { "" }
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], map_justification_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawJustification::into_justification).transpose()
  }

  async fn update_justification(
    &self,
    justification_id: Uuid,
    fields: JustificationUpdate,
  ) -> Result<Justification> {
    let id_str = encode_uuid(justification_id);
    let type_id = fields.type_id;
    let start_str = encode_date(fields.date_start);
    let finish_str = fields.date_finish.map(encode_date);
    let file = fields.file;
    let details = fields.details;
    let author_str = encode_uuid(fields.author_user_id);

    let raw: Option<RawJustification> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // COALESCE keeps the stored file reference when no replacement was
        // supplied; the soft-delete guard makes deleted rows unreachable.
        let changed = tx.execute(
          "UPDATE justifications
           SET type_id = ?2, date_start = ?3, date_finish = ?4,
               details = ?5, author_user_id = ?6,
               file = COALESCE(?7, file)
           WHERE justification_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![
            id_str, type_id, start_str, finish_str, details, author_str, file,
          ],
        )?;

        if changed == 0 {
          return Ok(None);
        }

        let sql = format!(
          "SELECT {JUSTIFICATION_COLS} FROM justifications WHERE justification_id = ?1"
        );
        let row = tx.query_row(&sql, rusqlite::params![id_str], map_justification_row)?;

        tx.commit()?;
        Ok(Some(row))
      })
      .await?;

    match raw {
      Some(raw) => raw.into_justification(),
      None => Err(Error::JustificationNotFound(justification_id)),
    }
  }

  async fn soft_delete_justification(&self, justification_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(justification_id);
    let deleted_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE justifications SET deleted_at = ?2
           WHERE justification_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id_str, deleted_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::JustificationNotFound(justification_id));
    }
    Ok(())
  }

  async fn justifications_for_employee(
    &self,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<JustificationView>> {
    let emp_str = encode_uuid(employee_id);
    let start_str = encode_date(start);
    let end_str = encode_date(end);

    let raws: Vec<RawJustificationView> = self
      .conn
      .call(move |conn| {
        // Interval overlap against the effective range: a record without a
        // finish date covers its start date only.
        let sql = format!(
          "SELECT j.{}, e.name, t.name
           FROM justifications j
           JOIN employees e ON e.employee_id = j.employee_id
           JOIN justification_types t ON t.type_id = j.type_id
           WHERE j.employee_id = ?1 AND j.deleted_at IS NULL
             AND j.date_start <= ?3
             AND COALESCE(j.date_finish, j.date_start) >= ?2
           ORDER BY j.date_start",
          JUSTIFICATION_COLS.replace(", ", ", j.")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![emp_str, start_str, end_str], map_view_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJustificationView::into_view).collect()
  }

  async fn list_justifications(
    &self,
    filter: &ScopeFilter,
    offset: usize,
    limit: usize,
  ) -> Result<Vec<JustificationView>> {
    // DenyAll never reaches the database.
    let (gd, dir, sub) = match filter {
      ScopeFilter::DenyAll => return Ok(Vec::new()),
      ScopeFilter::Unrestricted => (None, None, None),
      ScopeFilter::Scoped {
        general_direction_id,
        direction_id,
        subdirectorate_id,
      } => (Some(*general_direction_id), *direction_id, *subdirectorate_id),
    };

    let limit = limit as i64;
    let offset = offset as i64;

    let raws: Vec<RawJustificationView> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT j.{}, e.name, t.name
           FROM justifications j
           JOIN employees e ON e.employee_id = j.employee_id
           JOIN justification_types t ON t.type_id = j.type_id
           WHERE j.deleted_at IS NULL
             AND (?1 IS NULL OR e.general_direction_id = ?1)
             AND (?2 IS NULL OR e.direction_id = ?2)
             AND (?3 IS NULL OR e.subdirectorate_id = ?3)
           ORDER BY j.created_at DESC
           LIMIT ?4 OFFSET ?5",
          JUSTIFICATION_COLS.replace(", ", ", j.")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![gd, dir, sub, limit, offset], map_view_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJustificationView::into_view).collect()
  }
}
