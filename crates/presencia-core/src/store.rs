//! The `AttendanceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `presencia-store-sqlite`). Higher layers (`presencia-api`, the workflow
//! engine) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  employee::{Employee, NewEmployee},
  incident::{Incident, NewIncident},
  justification::{
    Justification, JustificationType, JustificationUpdate, JustificationView,
    NewJustification,
  },
  scope::ScopeFilter,
};

// ─── Visibility ──────────────────────────────────────────────────────────────

/// Whether a read may surface soft-deleted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  /// The default for every normal query.
  ActiveOnly,
  /// Audit path: deleted records are returned with their deletion marker.
  IncludeDeleted,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the attendance database.
///
/// Each write method is one atomic unit: `create_justification` inserts the
/// record and reconciles the incident ledger inside a single transaction, so
/// no caller can observe one without the other.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Justification-type catalog ────────────────────────────────────────

  /// Look up one catalog entry. `None` if the id is unknown.
  fn justification_type(
    &self,
    type_id: i64,
  ) -> impl Future<Output = Result<Option<JustificationType>, Self::Error>> + Send + '_;

  /// All catalog entries, ordered by id.
  fn justification_types(
    &self,
  ) -> impl Future<Output = Result<Vec<JustificationType>, Self::Error>> + Send + '_;

  /// Register a catalog entry. Used by administration and test seeding.
  fn add_justification_type<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<JustificationType, Self::Error>> + Send + 'a;

  // ── Employee directory ────────────────────────────────────────────────

  /// Create and persist an employee record.
  fn add_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Retrieve an employee by internal id. Returns `None` if not found.
  fn employee(
    &self,
    employee_id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Retrieve an employee by payroll number. Returns `None` if not found.
  fn employee_by_number<'a>(
    &'a self,
    employee_number: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  // ── Incident ledger ───────────────────────────────────────────────────

  /// Log one per-day incident.
  fn record_incident(
    &self,
    input: NewIncident,
  ) -> impl Future<Output = Result<Incident, Self::Error>> + Send + '_;

  /// All incidents of `employee_id` dated in `[start, end]`, ordered by date.
  fn incidents_for_employee(
    &self,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Incident>, Self::Error>> + Send + '_;

  // ── Justification repository ──────────────────────────────────────────

  /// Insert a record and delete the employee's incidents inside the
  /// record's effective date range, atomically. Returns the persisted
  /// record and the number of incidents reconciled away.
  fn create_justification(
    &self,
    input: NewJustification,
  ) -> impl Future<Output = Result<(Justification, u64), Self::Error>> + Send + '_;

  /// Retrieve a record by id under the given visibility policy.
  fn justification(
    &self,
    justification_id: Uuid,
    visibility: Visibility,
  ) -> impl Future<Output = Result<Option<Justification>, Self::Error>> + Send + '_;

  /// Rewrite every mutable field of an active record. Never touches the
  /// incident ledger. Errors if the record is absent or soft-deleted.
  fn update_justification(
    &self,
    justification_id: Uuid,
    fields: JustificationUpdate,
  ) -> impl Future<Output = Result<Justification, Self::Error>> + Send + '_;

  /// Mark an active record deleted. Errors if it is absent or already
  /// soft-deleted.
  fn soft_delete_justification(
    &self,
    justification_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Active records of one employee whose effective range overlaps
  /// `[start, end]`, with display names resolved.
  fn justifications_for_employee(
    &self,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<JustificationView>, Self::Error>> + Send + '_;

  /// One page of active records visible under `filter`, newest first.
  fn list_justifications<'a>(
    &'a self,
    filter: &'a ScopeFilter,
    offset: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<JustificationView>, Self::Error>> + Send + 'a;
}
