//! Handlers for `/justifications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/justifications?p=N` | Scope-filtered page of 25, newest first |
//! | `PATCH`  | `/justifications/{id}` | Full rewrite of mutable fields |
//! | `DELETE` | `/justifications/{id}` | Soft delete; 404 if already deleted |
//! | `GET`    | `/justifications/{id}/file` | Inline PDF of the evidence document |

use axum::{
  Json,
  body::Body,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use chrono::NaiveDate;
use presencia_core::{
  files::FileStore,
  justification::{Justification, JustificationView, UpdateJustificationCommand},
  scope::ScopeFilter,
  store::AttendanceStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, context::context_from_headers, error::ApiError};

/// Fixed page size for the admin listing.
pub const PAGE_SIZE: usize = 25;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub p: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Paginator {
  pub page:     usize,
  pub elements: usize,
  pub previous: bool,
  /// Derived from the page being full-sized; there is no total count.
  pub next:     bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub justifications: Vec<JustificationView>,
  pub paginator:      Paginator,
}

/// `GET /justifications?p=N`
pub async fn list<S, F>(
  State(state): State<AppState<S, F>>,
  Query(params): Query<PageParams>,
  headers: HeaderMap,
) -> Result<Json<ListResponse>, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let ctx = context_from_headers(&headers)?;
  let page = params.p.unwrap_or(1).max(1);

  let filter = ScopeFilter::for_context(&ctx);
  let justifications = state
    .store
    .list_justifications(&filter, (page - 1) * PAGE_SIZE, PAGE_SIZE)
    .await
    .map_err(ApiError::internal)?;

  let paginator = Paginator {
    page,
    elements: PAGE_SIZE,
    previous: page > 1,
    next: justifications.len() >= PAGE_SIZE,
  };

  Ok(Json(ListResponse { justifications, paginator }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub type_id:     i64,
  pub date_start:  NaiveDate,
  pub date_finish: Option<NaiveDate>,
  pub details:     Option<String>,
  /// Base64-encoded replacement document; omit to keep the stored one.
  pub document:    Option<String>,
}

/// `PATCH /justifications/{id}`
pub async fn update<S, F>(
  State(state): State<AppState<S, F>>,
  Path(justification_id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Justification>, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let ctx = context_from_headers(&headers)?;
  let document = body
    .document
    .map(|encoded| decode_document(&encoded))
    .transpose()?;

  let updated = state
    .workflow
    .update(&ctx, UpdateJustificationCommand {
      justification_id,
      type_id: body.type_id,
      date_start: body.date_start,
      date_finish: body.date_finish,
      details: body.details,
      document,
    })
    .await?;

  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /justifications/{id}`
pub async fn destroy<S, F>(
  State(state): State<AppState<S, F>>,
  Path(justification_id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let ctx = context_from_headers(&headers)?;
  state.workflow.delete(&ctx, justification_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Document retrieval ───────────────────────────────────────────────────────

/// `GET /justifications/{id}/file` — the stored document as an inline PDF.
pub async fn document<S, F>(
  State(state): State<AppState<S, F>>,
  Path(justification_id): Path<Uuid>,
) -> Result<Response, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let (basename, bytes) = state.workflow.document(justification_id).await?;

  let response = Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, "application/pdf")
    .header(
      header::CONTENT_DISPOSITION,
      format!("inline; filename=\"{basename}\""),
    )
    .header(header::CONTENT_LENGTH, bytes.len())
    .body(Body::from(bytes))
    .map_err(ApiError::internal)?;

  Ok(response.into_response())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

pub(crate) fn decode_document(encoded: &str) -> Result<Vec<u8>, ApiError> {
  base64::engine::general_purpose::STANDARD
    .decode(encoded)
    .map_err(|_| ApiError::BadRequest("document is not valid base64".into()))
}
