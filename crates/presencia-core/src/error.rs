//! Error taxonomy for the justification workflow.
//!
//! Callers translate these into user-facing messages and status codes
//! (not-found → 404, validation → 422, storage/persistence → 500); the core
//! only classifies and raises.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A command field is missing or malformed (bad date range, empty
  /// document, unknown justification type). Surfaced as a form error.
  #[error("validation: {0}")]
  Validation(String),

  #[error("employee not found: {0}")]
  EmployeeNotFound(String),

  #[error("justification not found: {0}")]
  JustificationNotFound(Uuid),

  /// The record exists but its document is gone from the file store.
  #[error("document missing for justification {0}")]
  DocumentMissing(Uuid),

  /// File store read/write/delete failure.
  #[error("file storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Database failure; the surrounding transaction has been rolled back.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }

  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
