//! Error type for `presencia-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to update or soft-delete a record that is absent or already
  /// soft-deleted.
  #[error("justification not found: {0}")]
  JustificationNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
