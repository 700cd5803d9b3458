//! JSON/octet-stream HTTP layer for Presencia.
//!
//! Exposes an axum [`Router`] backed by any
//! [`presencia_core::store::AttendanceStore`] and
//! [`presencia_core::files::FileStore`]. Authentication and transport
//! concerns live in front of this service; the actor's identity arrives as
//! gateway headers (see [`context`]).

pub mod catalog;
pub mod context;
pub mod employees;
pub mod error;
pub mod justifications;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, patch},
};
use presencia_core::{
  files::FileStore, store::AttendanceStore, workflow::JustificationWorkflow,
};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub db_path:    PathBuf,
  /// Root directory of the document file store.
  pub files_root: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, F> {
  pub store:    Arc<S>,
  pub workflow: Arc<JustificationWorkflow<S, F>>,
}

impl<S, F> AppState<S, F>
where
  S: AttendanceStore,
  F: FileStore,
{
  pub fn new(store: Arc<S>, files: Arc<F>) -> Self {
    let workflow = Arc::new(JustificationWorkflow::new(store.clone(), files));
    Self { store, workflow }
  }
}

// Manual impl: `#[derive(Clone)]` would demand `S: Clone` and `F: Clone`.
impl<S, F> Clone for AppState<S, F> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      workflow: self.workflow.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, F>(state: AppState<S, F>) -> Router<()>
where
  S: AttendanceStore + 'static,
  F: FileStore + 'static,
{
  Router::new()
    .route("/justifications", get(justifications::list::<S, F>))
    .route(
      "/justifications/{id}",
      patch(justifications::update::<S, F>).delete(justifications::destroy::<S, F>),
    )
    .route("/justifications/{id}/file", get(justifications::document::<S, F>))
    .route("/justification-types", get(catalog::types::<S, F>))
    .route(
      "/employees/{employee_number}/justifications",
      get(employees::index::<S, F>).post(employees::store::<S, F>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use chrono::NaiveDate;
  use presencia_core::{
    employee::{Employee, NewEmployee},
    incident::NewIncident,
    justification::JustificationType,
    store::AttendanceStore,
  };
  use presencia_files::DiskFileStore;
  use presencia_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  type TestState = AppState<SqliteStore, DiskFileStore>;

  async fn make_state() -> TestState {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let files_root =
      std::env::temp_dir().join(format!("presencia-api-{}", Uuid::new_v4()));
    AppState::new(
      Arc::new(store),
      Arc::new(DiskFileStore::new(files_root)),
    )
  }

  async fn seed_type(state: &TestState, name: &str) -> JustificationType {
    state.store.add_justification_type(name).await.unwrap()
  }

  async fn seed_employee(
    state: &TestState,
    number: &str,
    gd: i64,
    dir: i64,
    sub: i64,
  ) -> Employee {
    state
      .store
      .add_employee(NewEmployee {
        employee_number:      number.into(),
        name:                 format!("Employee {number}"),
        general_direction_id: gd,
        direction_id:         dir,
        subdirectorate_id:    sub,
      })
      .await
      .unwrap()
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  /// Gateway headers for an actor at `level` in gd/dir/sub 7/3/9.
  fn actor_headers(level: i32) -> Vec<(&'static str, String)> {
    vec![
      ("x-actor-id", Uuid::new_v4().to_string()),
      ("x-actor-name", "admin".to_string()),
      ("x-actor-level", level.to_string()),
      ("x-general-direction", "7".to_string()),
      ("x-direction", "3".to_string()),
      ("x-subdirectorate", "9".to_string()),
    ]
  }

  async fn send(
    state: TestState,
    method: &str,
    uri: &str,
    headers: Vec<(&'static str, String)>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
      builder = builder.header(name, value);
    }
    let request = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state).oneshot(request).await.unwrap()
  }

  async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn create_body(type_id: i64, start: &str, finish: Option<&str>, doc: &[u8]) -> Value {
    json!({
      "type_id": type_id,
      "date_start": start,
      "date_finish": finish,
      "details": "test justification",
      "document": B64.encode(doc),
    })
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_reconciles_incidents_inside_range() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    let emp = seed_employee(&state, "1001", 7, 3, 9).await;

    // Incidents on 03-02 (inside) and 03-05 (outside).
    for d in [day(2024, 3, 2), day(2024, 3, 5)] {
      state
        .store
        .record_incident(NewIncident { employee_id: emp.employee_id, date: d })
        .await
        .unwrap();
    }

    let response = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", Some("2024-03-03"), b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let remaining = state
      .store
      .incidents_for_employee(emp.employee_id, day(2024, 1, 1), day(2024, 12, 31))
      .await
      .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].date, day(2024, 3, 5));
  }

  #[tokio::test]
  async fn create_accepts_equal_start_and_finish() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let response = send(
      state,
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-05", Some("2024-03-05"), b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn create_with_unknown_type_is_unprocessable() {
    let state = make_state().await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let response = send(
      state,
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(999, "2024-03-01", None, b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn create_with_inverted_range_is_unprocessable() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let response = send(
      state,
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-05", Some("2024-03-01"), b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn create_with_bad_base64_is_rejected() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let body = json!({
      "type_id": ty.type_id,
      "date_start": "2024-03-01",
      "document": "not@valid@base64!",
    });
    let response = send(
      state,
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn create_for_unknown_employee_is_404() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;

    let response = send(
      state,
      "POST",
      "/employees/9999/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn create_without_actor_headers_is_rejected() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let response = send(
      state,
      "POST",
      "/employees/1001/justifications",
      vec![],
      Some(create_body(ty.type_id, "2024-03-01", None, b"%PDF doc")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  }

  // ── Query ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn query_roundtrip_returns_created_record() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let created = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", Some("2024-03-03"), b"%PDF doc")),
    )
    .await;
    let created = body_json(created).await;

    let response = send(
      state,
      "GET",
      "/employees/1001/justifications?from=2024-03-01&to=2024-03-31",
      vec![],
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    let hits = payload["justifications"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(
      hits[0]["justification"]["justification_id"],
      created["justification_id"]
    );
    assert_eq!(hits[0]["justification"]["date_start"], "2024-03-01");
    assert_eq!(hits[0]["justification"]["date_finish"], "2024-03-03");
    assert_eq!(hits[0]["type_name"], "Medical");
  }

  #[tokio::test]
  async fn query_accepts_month_shorthand() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-15", None, b"%PDF doc")),
    )
    .await;

    let response = send(
      state,
      "GET",
      "/employees/1001/justifications?y=2024&m=3",
      vec![],
      None,
    )
    .await;
    let payload = body_json(response).await;
    assert_eq!(payload["from"], "2024-03-01");
    assert_eq!(payload["to"], "2024-03-31");
    assert_eq!(payload["justifications"].as_array().unwrap().len(), 1);
  }

  // ── Document retrieval ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn document_is_served_inline_as_pdf() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let created = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"%PDF-1.4 contents")),
    )
    .await;
    let id = body_json(created).await["justification_id"]
      .as_str()
      .unwrap()
      .to_string();

    let response = send(
      state,
      "GET",
      &format!("/justifications/{id}/file"),
      vec![],
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      response.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/pdf"
    );
    assert_eq!(
      response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
      "inline; filename=\"1001-2024-03-01.pdf\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 contents");
  }

  #[tokio::test]
  async fn document_of_unknown_justification_is_404() {
    let state = make_state().await;
    let response = send(
      state,
      "GET",
      &format!("/justifications/{}/file", Uuid::new_v4()),
      vec![],
      None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn repeat_create_overwrites_document_at_same_key() {
    // Two creates for the same employee and start date share a file key;
    // the second overwrites the first's blob. Asserts current behaviour.
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let first = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"first document")),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_id = body_json(first).await["justification_id"]
      .as_str()
      .unwrap()
      .to_string();

    let second = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"second document")),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);

    let response = send(
      state,
      "GET",
      &format!("/justifications/{first_id}/file"),
      vec![],
      None,
    )
    .await;
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"second document");
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_rewrites_fields_without_reconciling() {
    let state = make_state().await;
    let medical = seed_type(&state, "Medical").await;
    let vacation = seed_type(&state, "Vacation").await;
    let emp = seed_employee(&state, "1001", 7, 3, 9).await;

    let created = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(medical.type_id, "2024-03-01", None, b"%PDF doc")),
    )
    .await;
    let id = body_json(created).await["justification_id"]
      .as_str()
      .unwrap()
      .to_string();

    // Logged after create; inside the widened range the update sets.
    state
      .store
      .record_incident(NewIncident { employee_id: emp.employee_id, date: day(2024, 3, 2) })
      .await
      .unwrap();

    let response = send(
      state.clone(),
      "PATCH",
      &format!("/justifications/{id}"),
      actor_headers(1),
      Some(json!({
        "type_id": vacation.type_id,
        "date_start": "2024-03-01",
        "date_finish": "2024-03-04",
        "details": "extended",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["type_id"], vacation.type_id);
    assert_eq!(updated["date_finish"], "2024-03-04");
    assert_eq!(updated["details"], "extended");

    // Update never reconciles incidents.
    let incidents = state
      .store
      .incidents_for_employee(emp.employee_id, day(2024, 3, 1), day(2024, 3, 4))
      .await
      .unwrap();
    assert_eq!(incidents.len(), 1);
  }

  #[tokio::test]
  async fn update_with_replacement_document_stores_new_bytes() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let created = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"old document")),
    )
    .await;
    let id = body_json(created).await["justification_id"]
      .as_str()
      .unwrap()
      .to_string();

    let response = send(
      state.clone(),
      "PATCH",
      &format!("/justifications/{id}"),
      actor_headers(1),
      Some(json!({
        "type_id": ty.type_id,
        "date_start": "2024-03-01",
        "document": B64.encode(b"new document"),
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = send(
      state,
      "GET",
      &format!("/justifications/{id}/file"),
      vec![],
      None,
    )
    .await;
    let bytes = axum::body::to_bytes(fetched.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&bytes[..], b"new document");
  }

  #[tokio::test]
  async fn update_of_unknown_justification_is_404() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;

    let response = send(
      state,
      "PATCH",
      &format!("/justifications/{}", Uuid::new_v4()),
      actor_headers(1),
      Some(json!({
        "type_id": ty.type_id,
        "date_start": "2024-03-01",
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_hides_record_and_second_delete_is_404() {
    let state = make_state().await;
    let ty = seed_type(&state, "Medical").await;
    seed_employee(&state, "1001", 7, 3, 9).await;

    let created = send(
      state.clone(),
      "POST",
      "/employees/1001/justifications",
      actor_headers(1),
      Some(create_body(ty.type_id, "2024-03-01", None, b"%PDF doc")),
    )
    .await;
    let id = body_json(created).await["justification_id"]
      .as_str()
      .unwrap()
      .to_string();

    let first = send(
      state.clone(),
      "DELETE",
      &format!("/justifications/{id}"),
      actor_headers(1),
      None,
    )
    .await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    // Gone from the employee query...
    let query = send(
      state.clone(),
      "GET",
      "/employees/1001/justifications?from=2024-03-01&to=2024-03-31",
      vec![],
      None,
    )
    .await;
    let payload = body_json(query).await;
    assert!(payload["justifications"].as_array().unwrap().is_empty());

    // ...and a repeat delete reports not-found rather than failing oddly.
    let second = send(
      state,
      "DELETE",
      &format!("/justifications/{id}"),
      actor_headers(1),
      None,
    )
    .await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
  }

  // ── Listing and scope ───────────────────────────────────────────────────────

  async fn seed_two_directions(state: &TestState) {
    let ty = seed_type(state, "Medical").await;
    seed_employee(state, "1001", 7, 3, 9).await;
    seed_employee(state, "2001", 8, 1, 1).await;

    for number in ["1001", "2001"] {
      let response = send(
        state.clone(),
        "POST",
        &format!("/employees/{number}/justifications"),
        actor_headers(1),
        Some(create_body(ty.type_id, "2024-03-01", None, b"%PDF doc")),
      )
      .await;
      assert_eq!(response.status(), StatusCode::CREATED);
    }
  }

  #[tokio::test]
  async fn level_two_actor_sees_only_own_general_direction() {
    let state = make_state().await;
    seed_two_directions(&state).await;

    let response = send(state, "GET", "/justifications", actor_headers(2), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    let rows = payload["justifications"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_name"], "Employee 1001");
  }

  #[tokio::test]
  async fn level_zero_actor_sees_nothing() {
    let state = make_state().await;
    seed_two_directions(&state).await;

    let response = send(state, "GET", "/justifications", actor_headers(0), None).await;
    let payload = body_json(response).await;
    assert!(payload["justifications"].as_array().unwrap().is_empty());
    assert_eq!(payload["paginator"]["next"], false);
  }

  #[tokio::test]
  async fn paginator_flags_follow_page_fill() {
    let state = make_state().await;
    seed_two_directions(&state).await;

    let response = send(state, "GET", "/justifications?p=1", actor_headers(1), None).await;
    let payload = body_json(response).await;
    assert_eq!(payload["paginator"]["page"], 1);
    assert_eq!(payload["paginator"]["previous"], false);
    // Two rows < page size, so there is no next page.
    assert_eq!(payload["paginator"]["next"], false);
  }

  // ── Catalog ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn types_endpoint_lists_catalog() {
    let state = make_state().await;
    seed_type(&state, "Medical").await;
    seed_type(&state, "Vacation").await;

    let response = send(state, "GET", "/justification-types", vec![], None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response).await;
    let names: Vec<_> = payload
      .as_array()
      .unwrap()
      .iter()
      .map(|t| t["name"].as_str().unwrap().to_string())
      .collect();
    assert_eq!(names, ["Medical", "Vacation"]);
  }
}
