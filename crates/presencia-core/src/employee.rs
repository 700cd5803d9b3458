//! Employee directory types and the per-request actor context.
//!
//! Employees are read-mostly from the workflow's perspective: the engine only
//! needs a name for audit lines and the organisational scope fields the
//! listing filter runs on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An employee as seen by the justification workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub employee_id:          Uuid,
  /// Human-facing payroll number; also the stem of document file keys.
  pub employee_number:      String,
  pub name:                 String,
  pub general_direction_id: i64,
  pub direction_id:         i64,
  pub subdirectorate_id:    i64,
}

/// Input to [`crate::store::AttendanceStore::add_employee`].
/// `employee_id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEmployee {
  pub employee_number:      String,
  pub name:                 String,
  pub general_direction_id: i64,
  pub direction_id:         i64,
  pub subdirectorate_id:    i64,
}

/// The authenticated actor behind one request, resolved by the caller and
/// passed explicitly into every workflow and filter call. Replaces any notion
/// of ambient session state.
#[derive(Debug, Clone)]
pub struct RequestContext {
  pub actor_user_id:        Uuid,
  pub actor_name:           String,
  /// Authorization level; higher values restrict visibility to a narrower
  /// organisational subtree. See [`crate::scope::ScopeFilter`].
  pub level:                i32,
  pub general_direction_id: i64,
  pub direction_id:         i64,
  pub subdirectorate_id:    i64,
}
