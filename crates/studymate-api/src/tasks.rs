//! Handlers for `/tasks` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tasks` | Optional `?tab=all\|completed\|pending\|overdue` and `?completed=bool` |
//! | `POST`   | `/tasks` | Body: [`NewTask`]; returns 201 + `{"id":...}` |
//! | `GET`    | `/tasks/{id}` | Single [`TaskView`] |
//! | `PATCH`  | `/tasks/{id}` | Body: [`TaskPatch`] |
//! | `DELETE` | `/tasks/{id}` | |
//! | `POST`   | `/tasks/{id}/completed` | Body: `{"completed":true}` |
//!
//! Every task in a response carries its derived `status` and the name of its
//! subject.

use std::collections::HashMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use studymate_core::{
  access::tasks,
  blob::BlobStore,
  document::DocumentStore,
  schedule::{Status, Tab, UNKNOWN_SUBJECT, classify, filter_by_tab},
  session::Session,
  task::{NewTask, Task, TaskPatch},
};

use crate::{
  ApiState, Authenticator, CurrentSession,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

/// A task as rendered in list and detail views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
  #[serde(flatten)]
  pub task:         Task,
  pub status:       Status,
  pub subject_name: String,
}

impl TaskView {
  fn new(task: Task, now: DateTime<Utc>, names: &HashMap<String, String>) -> Self {
    let status = classify(&task, now);
    let subject_name = names
      .get(&task.subject_id)
      .cloned()
      .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned());
    Self { task, status, subject_name }
  }
}

async fn view_one<S, B, A>(
  state: &ApiState<S, B, A>,
  session: &Session,
  task: Task,
) -> Result<TaskView, ApiError>
where
  S: DocumentStore,
{
  let names = state
    .names
    .resolve(&*state.store, session, std::slice::from_ref(&task))
    .await?;
  Ok(TaskView::new(task, Utc::now(), &names))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub tab:       Tab,
  /// Restrict to tasks with this completion flag before tab filtering.
  pub completed: Option<bool>,
}

/// `GET /tasks[?tab=...][&completed=...]`
pub async fn list<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<TaskView>>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  let all = match params.completed {
    Some(completed) => tasks::list_by_status(store, &session, completed).await?,
    None => tasks::list_mine(store, &session).await?,
  };

  let now = Utc::now();
  let shown = filter_by_tab(&all, params.tab, now);
  let names = state.names.resolve(store, &session, &shown).await?;

  Ok(Json(
    shown
      .into_iter()
      .map(|task| TaskView::new(task.clone(), now, &names))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /tasks`
pub async fn create<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  JsonBody(body): JsonBody<NewTask>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let id = tasks::create(&*state.store, &session, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tasks/{id}`
pub async fn get_one<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
) -> Result<Json<TaskView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let task = tasks::get(&*state.store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, task).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /tasks/{id}`
pub async fn update<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
  JsonBody(patch): JsonBody<TaskPatch>,
) -> Result<Json<TaskView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  tasks::update(store, &session, &id, patch).await?;
  let task = tasks::get(store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, task).await?))
}

#[derive(Debug, Deserialize)]
pub struct CompletedBody {
  pub completed: bool,
}

/// `POST /tasks/{id}/completed`: body: `{"completed":true}`
pub async fn set_completed<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<CompletedBody>,
) -> Result<Json<TaskView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  tasks::set_completed(store, &session, &id, body.completed).await?;
  let task = tasks::get(store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, task).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /tasks/{id}`
pub async fn delete<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  tasks::delete(&*state.store, &session, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}
