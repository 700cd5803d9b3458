//! Handler for the justification-type catalog.

use axum::{Json, extract::State};
use presencia_core::{
  files::FileStore, justification::JustificationType, store::AttendanceStore,
};

use crate::{AppState, error::ApiError};

/// `GET /justification-types`
pub async fn types<S, F>(
  State(state): State<AppState<S, F>>,
) -> Result<Json<Vec<JustificationType>>, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let types = state
    .store
    .justification_types()
    .await
    .map_err(ApiError::internal)?;
  Ok(Json(types))
}
