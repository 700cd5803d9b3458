//! Incident ledger types.
//!
//! An incident is a per-day attendance anomaly logged independently of
//! justifications. The two are never linked by id; a justification's creation
//! deletes the incidents whose date falls inside its range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One attendance anomaly for one employee on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
  pub incident_id: Uuid,
  pub employee_id: Uuid,
  pub date:        NaiveDate,
}

/// Input to [`crate::store::AttendanceStore::record_incident`].
#[derive(Debug, Clone)]
pub struct NewIncident {
  pub employee_id: Uuid,
  pub date:        NaiveDate,
}
