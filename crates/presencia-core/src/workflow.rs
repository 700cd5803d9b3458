//! The justification workflow engine.
//!
//! Orchestrates create/update/delete across the file store and the
//! attendance store. Each operation is one atomic database unit (delegated to
//! [`AttendanceStore`]); file I/O happens outside that unit, which leaves two
//! documented gaps:
//!
//! - create: a store failure after a successful `put` leaves an orphaned
//!   blob (logged, not cleaned up);
//! - update: a replacement document overwrites the deterministic key, but a
//!   previous file stored under a different start date is not deleted.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Error, Result,
  employee::{Employee, RequestContext},
  files::FileStore,
  justification::{
    CreateJustificationCommand, Justification, JustificationUpdate,
    JustificationView, NewJustification, UpdateJustificationCommand,
    document_key,
  },
  store::{AttendanceStore, Visibility},
};

/// The decision core: validates commands, moves documents in and out of the
/// file store, and drives the repository's atomic operations.
pub struct JustificationWorkflow<S, F> {
  store: Arc<S>,
  files: Arc<F>,
}

impl<S, F> JustificationWorkflow<S, F>
where
  S: AttendanceStore,
  F: FileStore,
{
  pub fn new(store: Arc<S>, files: Arc<F>) -> Self { Self { store, files } }

  /// Create a justification for `employee`.
  ///
  /// The document is written first; if the transactional insert then fails,
  /// the blob stays behind. Incidents of the employee dated inside the
  /// effective range are deleted in the same transaction as the insert.
  pub async fn create(
    &self,
    ctx: &RequestContext,
    employee: &Employee,
    cmd: CreateJustificationCommand,
  ) -> Result<Justification> {
    cmd.validate()?;
    self.require_type(cmd.type_id).await?;

    let key = document_key(&employee.employee_number, cmd.date_start);
    self
      .files
      .put(&key, &cmd.document)
      .await
      .map_err(Error::storage)?;

    let input = NewJustification {
      employee_id:    employee.employee_id,
      type_id:        cmd.type_id,
      date_start:     cmd.date_start,
      date_finish:    cmd.date_finish,
      file:           key.clone(),
      details:        cmd.details,
      author_user_id: ctx.actor_user_id,
    };

    let (record, reconciled) = match self.store.create_justification(input).await {
      Ok(created) => created,
      Err(err) => {
        tracing::error!(
          employee = %employee.name,
          file = %key,
          error = %err,
          "justification insert rolled back; document blob left orphaned",
        );
        return Err(Error::persistence(err));
      }
    };

    tracing::info!(
      actor = %ctx.actor_name,
      actor_id = %ctx.actor_user_id,
      employee = %employee.name,
      from = %record.date_start,
      to = %record.effective_finish(),
      reconciled,
      "justification created",
    );

    Ok(record)
  }

  /// Rewrite an existing justification.
  ///
  /// Unlike create, this never reconciles incidents. A replacement document
  /// is stored under the key policy of create; without one the existing file
  /// reference is retained unchanged.
  pub async fn update(
    &self,
    ctx: &RequestContext,
    cmd: UpdateJustificationCommand,
  ) -> Result<Justification> {
    cmd.validate()?;

    let existing = self
      .store
      .justification(cmd.justification_id, Visibility::ActiveOnly)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::JustificationNotFound(cmd.justification_id))?;

    self.require_type(cmd.type_id).await?;

    let file = match &cmd.document {
      Some(document) => {
        let employee = self.require_employee(existing.employee_id).await?;
        let key = document_key(&employee.employee_number, cmd.date_start);
        self
          .files
          .put(&key, document)
          .await
          .map_err(Error::storage)?;
        Some(key)
      }
      None => None,
    };

    let updated = self
      .store
      .update_justification(cmd.justification_id, JustificationUpdate {
        type_id: cmd.type_id,
        date_start: cmd.date_start,
        date_finish: cmd.date_finish,
        file,
        details: cmd.details,
        author_user_id: ctx.actor_user_id,
      })
      .await
      .map_err(Error::persistence)?;

    tracing::info!(
      actor = %ctx.actor_name,
      actor_id = %ctx.actor_user_id,
      justification = %updated.justification_id,
      "justification updated",
    );

    Ok(updated)
  }

  /// Soft-delete a record and hard-delete its document.
  ///
  /// File removal is best-effort: a storage failure is logged and the
  /// soft-delete still goes through. Deleting an already-deleted id surfaces
  /// as [`Error::JustificationNotFound`].
  pub async fn delete(
    &self,
    ctx: &RequestContext,
    justification_id: Uuid,
  ) -> Result<()> {
    let record = self
      .store
      .justification(justification_id, Visibility::ActiveOnly)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::JustificationNotFound(justification_id))?;

    let employee = self.require_employee(record.employee_id).await?;

    match self.files.delete(&record.file).await {
      Ok(true) => {}
      Ok(false) => {
        tracing::warn!(file = %record.file, "document already absent on delete");
      }
      Err(err) => {
        tracing::error!(file = %record.file, error = %err, "failed to delete document");
      }
    }

    self
      .store
      .soft_delete_justification(justification_id)
      .await
      .map_err(Error::persistence)?;

    tracing::info!(
      actor = %ctx.actor_name,
      actor_id = %ctx.actor_user_id,
      employee = %employee.name,
      justification = %justification_id,
      "justification deleted",
    );

    Ok(())
  }

  /// Active justifications of one employee overlapping `[start, end]`.
  pub async fn justifications_for_employee(
    &self,
    employee: &Employee,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<JustificationView>> {
    self
      .store
      .justifications_for_employee(employee.employee_id, start, end)
      .await
      .map_err(Error::persistence)
  }

  /// Fetch the stored document for a record: `(basename, bytes)`.
  pub async fn document(
    &self,
    justification_id: Uuid,
  ) -> Result<(String, Vec<u8>)> {
    let record = self
      .store
      .justification(justification_id, Visibility::ActiveOnly)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::JustificationNotFound(justification_id))?;

    let bytes = self
      .files
      .get(&record.file)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::DocumentMissing(justification_id))?;

    let basename = record
      .file
      .rsplit('/')
      .next()
      .unwrap_or(record.file.as_str())
      .to_string();

    Ok((basename, bytes))
  }

  // ── Lookups ───────────────────────────────────────────────────────────

  async fn require_type(&self, type_id: i64) -> Result<()> {
    // An unknown type id is form input gone wrong, so it classifies as a
    // validation failure rather than a not-found.
    self
      .store
      .justification_type(type_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::Validation(format!("unknown justification type {type_id}")))?;
    Ok(())
  }

  async fn require_employee(&self, employee_id: Uuid) -> Result<Employee> {
    self
      .store
      .employee(employee_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::EmployeeNotFound(employee_id.to_string()))
  }
}
