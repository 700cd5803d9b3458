//! Justification — the central entity of this crate.
//!
//! A justification asserts that an employee's absence over an inclusive date
//! range is excused, backed by an evidence document held in the file store.
//! Records are soft-deleted: a deleted record stays in the repository for
//! audit but is invisible to every normal read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Document keys ───────────────────────────────────────────────────────────

/// Directory prefix every justification document is stored under.
pub const DOCUMENT_DIR: &str = "justificantes";

/// Deterministic file-store key for an employee's document.
///
/// A repeat justification for the same employee and start date overwrites the
/// previous blob at this key; there is no collision versioning.
pub fn document_key(employee_number: &str, date_start: NaiveDate) -> String {
  format!("{DOCUMENT_DIR}/{employee_number}-{}.pdf", date_start.format("%Y-%m-%d"))
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Immutable catalog entry naming a kind of justification (medical leave,
/// official commission, and so on). Referenced, never owned, by records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JustificationType {
  pub type_id: i64,
  pub name:    String,
}

// ─── Record state ────────────────────────────────────────────────────────────

/// Soft-delete state, modelled explicitly rather than as a nullable
/// timestamp convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordState {
  Active,
  Deleted { at: DateTime<Utc> },
}

impl RecordState {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// ─── Justification ───────────────────────────────────────────────────────────

/// A persisted justification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Justification {
  pub justification_id: Uuid,
  pub employee_id:      Uuid,
  pub type_id:          i64,
  pub date_start:       NaiveDate,
  /// `None` means a single-day justification; range logic treats the finish
  /// as equal to `date_start`.
  pub date_finish:      Option<NaiveDate>,
  /// File-store key of the evidence document. An active record always
  /// references a stored blob (enforced by the workflow, not the repository).
  pub file:             String,
  pub details:          Option<String>,
  /// The user who last wrote the record; rewritten on every create/update.
  pub author_user_id:   Uuid,
  pub created_at:       DateTime<Utc>,
  pub state:            RecordState,
}

impl Justification {
  /// The inclusive end of the effective range.
  pub fn effective_finish(&self) -> NaiveDate {
    self.date_finish.unwrap_or(self.date_start)
  }
}

/// A justification joined with display names for listing and range queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JustificationView {
  pub justification: Justification,
  pub employee_name: String,
  pub type_name:     String,
}

// ─── Store inputs ────────────────────────────────────────────────────────────

/// Input to [`crate::store::AttendanceStore::create_justification`].
/// `justification_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewJustification {
  pub employee_id:    Uuid,
  pub type_id:        i64,
  pub date_start:     NaiveDate,
  pub date_finish:    Option<NaiveDate>,
  pub file:           String,
  pub details:        Option<String>,
  pub author_user_id: Uuid,
}

/// Full rewrite of every mutable field of a record. There is no partial
/// update; the workflow always supplies the complete set.
#[derive(Debug, Clone)]
pub struct JustificationUpdate {
  pub type_id:        i64,
  pub date_start:     NaiveDate,
  pub date_finish:    Option<NaiveDate>,
  /// `None` retains the existing file reference.
  pub file:           Option<String>,
  pub details:        Option<String>,
  pub author_user_id: Uuid,
}

// ─── Commands ────────────────────────────────────────────────────────────────

/// Validated input to [`crate::workflow::JustificationWorkflow::create`].
#[derive(Debug, Clone)]
pub struct CreateJustificationCommand {
  pub type_id:     i64,
  pub date_start:  NaiveDate,
  pub date_finish: Option<NaiveDate>,
  pub details:     Option<String>,
  /// Raw bytes of the evidence document; required on create.
  pub document:    Vec<u8>,
}

impl CreateJustificationCommand {
  pub fn validate(&self) -> Result<()> {
    check_range(self.date_start, self.date_finish)?;
    if self.document.is_empty() {
      return Err(Error::Validation("document must not be empty".into()));
    }
    Ok(())
  }
}

/// Validated input to [`crate::workflow::JustificationWorkflow::update`].
#[derive(Debug, Clone)]
pub struct UpdateJustificationCommand {
  pub justification_id: Uuid,
  pub type_id:          i64,
  pub date_start:       NaiveDate,
  pub date_finish:      Option<NaiveDate>,
  pub details:          Option<String>,
  /// `None` keeps the stored document untouched.
  pub document:         Option<Vec<u8>>,
}

impl UpdateJustificationCommand {
  pub fn validate(&self) -> Result<()> {
    check_range(self.date_start, self.date_finish)?;
    if self.document.as_ref().is_some_and(|d| d.is_empty()) {
      return Err(Error::Validation("replacement document must not be empty".into()));
    }
    Ok(())
  }
}

fn check_range(start: NaiveDate, finish: Option<NaiveDate>) -> Result<()> {
  if let Some(finish) = finish
    && finish < start
  {
    return Err(Error::Validation(format!(
      "date_finish {finish} precedes date_start {start}"
    )));
  }
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
