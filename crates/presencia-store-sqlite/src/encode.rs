//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`
//! (which compares correctly as TEXT), and UUIDs as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use presencia_core::{
  employee::Employee,
  incident::Incident,
  justification::{Justification, JustificationView, RecordState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub employee_id:          String,
  pub employee_number:      String,
  pub name:                 String,
  pub general_direction_id: i64,
  pub direction_id:         i64,
  pub subdirectorate_id:    i64,
}

impl RawEmployee {
  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      employee_id:          decode_uuid(&self.employee_id)?,
      employee_number:      self.employee_number,
      name:                 self.name,
      general_direction_id: self.general_direction_id,
      direction_id:         self.direction_id,
      subdirectorate_id:    self.subdirectorate_id,
    })
  }
}

/// Raw strings read directly from an `incidents` row.
pub struct RawIncident {
  pub incident_id: String,
  pub employee_id: String,
  pub date:        String,
}

impl RawIncident {
  pub fn into_incident(self) -> Result<Incident> {
    Ok(Incident {
      incident_id: decode_uuid(&self.incident_id)?,
      employee_id: decode_uuid(&self.employee_id)?,
      date:        decode_date(&self.date)?,
    })
  }
}

/// Raw strings read directly from a `justifications` row.
pub struct RawJustification {
  pub justification_id: String,
  pub employee_id:      String,
  pub type_id:          i64,
  pub date_start:       String,
  pub date_finish:      Option<String>,
  pub file:             String,
  pub details:          Option<String>,
  pub author_user_id:   String,
  pub created_at:       String,
  pub deleted_at:       Option<String>,
}

impl RawJustification {
  pub fn into_justification(self) -> Result<Justification> {
    let state = match self.deleted_at {
      Some(at) => RecordState::Deleted { at: decode_dt(&at)? },
      None => RecordState::Active,
    };

    Ok(Justification {
      justification_id: decode_uuid(&self.justification_id)?,
      employee_id:      decode_uuid(&self.employee_id)?,
      type_id:          self.type_id,
      date_start:       decode_date(&self.date_start)?,
      date_finish:      self.date_finish.as_deref().map(decode_date).transpose()?,
      file:             self.file,
      details:          self.details,
      author_user_id:   decode_uuid(&self.author_user_id)?,
      created_at:       decode_dt(&self.created_at)?,
      state,
    })
  }
}

/// A `justifications` row joined with the employee and type display names.
pub struct RawJustificationView {
  pub justification: RawJustification,
  pub employee_name: String,
  pub type_name:     String,
}

impl RawJustificationView {
  pub fn into_view(self) -> Result<JustificationView> {
    Ok(JustificationView {
      justification: self.justification.into_justification()?,
      employee_name: self.employee_name,
      type_name:     self.type_name,
    })
  }
}
