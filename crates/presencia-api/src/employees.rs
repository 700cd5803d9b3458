//! Handlers for `/employees/{employee_number}/justifications`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `.../justifications?from=&to=` | Also accepts `?y=&m=` month shorthand |
//! | `POST` | `.../justifications` | Create; document travels as base64 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use presencia_core::{
  employee::Employee,
  files::FileStore,
  justification::{CreateJustificationCommand, JustificationView},
  store::AttendanceStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  context::context_from_headers,
  error::ApiError,
  justifications::decode_document,
};

// ─── Range query ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
  /// Month shorthand: `?y=2024&m=3` covers the whole month.
  pub y:    Option<i32>,
  pub m:    Option<u32>,
}

impl RangeParams {
  /// Resolve the requested window; defaults to today when nothing is given.
  fn resolve(&self) -> Result<(NaiveDate, NaiveDate), ApiError> {
    if let (Some(from), Some(to)) = (self.from, self.to) {
      return Ok((from, to));
    }
    if let (Some(y), Some(m)) = (self.y, self.m) {
      return month_range(y, m)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid month {y}-{m}")));
    }
    let today = Utc::now().date_naive();
    Ok((today, today))
  }
}

fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
  let start = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next_month = if month == 12 {
    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
  } else {
    NaiveDate::from_ymd_opt(year, month + 1, 1)?
  };
  Some((start, next_month.pred_opt()?))
}

#[derive(Debug, Serialize)]
pub struct EmployeeJustifications {
  pub employee:       Employee,
  pub from:           NaiveDate,
  pub to:             NaiveDate,
  pub justifications: Vec<JustificationView>,
}

/// `GET /employees/{employee_number}/justifications`
pub async fn index<S, F>(
  State(state): State<AppState<S, F>>,
  Path(employee_number): Path<String>,
  Query(params): Query<RangeParams>,
) -> Result<Json<EmployeeJustifications>, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let employee = find_employee(&state, &employee_number).await?;
  let (from, to) = params.resolve()?;

  let justifications = state
    .workflow
    .justifications_for_employee(&employee, from, to)
    .await?;

  Ok(Json(EmployeeJustifications { employee, from, to, justifications }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub type_id:     i64,
  pub date_start:  NaiveDate,
  pub date_finish: Option<NaiveDate>,
  pub details:     Option<String>,
  /// Base64-encoded evidence document (PDF).
  pub document:    String,
}

/// `POST /employees/{employee_number}/justifications`
pub async fn store<S, F>(
  State(state): State<AppState<S, F>>,
  Path(employee_number): Path<String>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  let ctx = context_from_headers(&headers)?;
  let employee = find_employee(&state, &employee_number).await?;
  let document = decode_document(&body.document)?;

  let record = state
    .workflow
    .create(&ctx, &employee, CreateJustificationCommand {
      type_id: body.type_id,
      date_start: body.date_start,
      date_finish: body.date_finish,
      details: body.details,
      document,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn find_employee<S, F>(
  state: &AppState<S, F>,
  employee_number: &str,
) -> Result<Employee, ApiError>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  state
    .store
    .employee_by_number(employee_number)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| {
      tracing::warn!(employee_number, "employee lookup failed");
      ApiError::NotFound(format!("employee {employee_number} not found"))
    })
}
