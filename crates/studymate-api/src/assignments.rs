//! Handlers for `/assignments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assignments` | Optional `?tab=...` and `?subject_id=...` |
//! | `POST`   | `/assignments` | Body: [`NewAssignment`]; returns 201 + `{"id":...}` |
//! | `GET`    | `/assignments/{id}` | |
//! | `PATCH`  | `/assignments/{id}` | Body: [`AssignmentPatch`] |
//! | `DELETE` | `/assignments/{id}` | |
//! | `POST`   | `/assignments/{id}/completed` | Body: `{"completed":true}` |

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
  access::assignments,
  assignment::{Assignment, AssignmentPatch, NewAssignment},
  blob::BlobStore,
  document::DocumentStore,
  schedule::{Status, Tab, UNKNOWN_SUBJECT, classify, filter_by_tab},
  session::Session,
};

use crate::{
  ApiState, Authenticator, CurrentSession,
  error::ApiError,
  extract::{JsonBody, QueryParams},
  tasks::CompletedBody,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
  #[serde(flatten)]
  pub assignment:   Assignment,
  pub status:       Status,
  pub subject_name: String,
}

impl AssignmentView {
  pub(crate) fn new(
    assignment: Assignment,
    now: DateTime<Utc>,
    names: &HashMap<String, String>,
  ) -> Self {
    Self {
      status: classify(&assignment, now),
      subject_name: names
        .get(&assignment.subject_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned()),
      assignment,
    }
  }
}

async fn view_one<S, B, A>(
  state: &ApiState<S, B, A>,
  session: &Session,
  assignment: Assignment,
) -> Result<AssignmentView, ApiError>
where
  S: DocumentStore,
{
  let names = state
    .names
    .resolve(&*state.store, session, std::slice::from_ref(&assignment))
    .await?;
  Ok(AssignmentView::new(assignment, Utc::now(), &names))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub tab:        Tab,
  pub subject_id: Option<String>,
}

/// `GET /assignments[?tab=...][&subject_id=...]`
pub async fn list<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<AssignmentView>>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  let all = match &params.subject_id {
    Some(subject_id) => assignments::list_by_subject(store, &session, subject_id).await?,
    None => assignments::list_mine(store, &session).await?,
  };

  let now = Utc::now();
  let shown = filter_by_tab(&all, params.tab, now);
  let names = state.names.resolve(store, &session, &shown).await?;

  Ok(Json(
    shown
      .into_iter()
      .map(|a| AssignmentView::new(a.clone(), now, &names))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /assignments`
pub async fn create<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  JsonBody(body): JsonBody<NewAssignment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let id = assignments::create(&*state.store, &session, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /assignments/{id}`
pub async fn get_one<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let assignment = assignments::get(&*state.store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, assignment).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /assignments/{id}`
pub async fn update<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
  JsonBody(patch): JsonBody<AssignmentPatch>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  assignments::update(store, &session, &id, patch).await?;
  let assignment = assignments::get(store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, assignment).await?))
}

/// `POST /assignments/{id}/completed`
pub async fn set_completed<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<CompletedBody>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  assignments::set_completed(store, &session, &id, body.completed).await?;
  let assignment = assignments::get(store, &session, &id).await?;
  Ok(Json(view_one(&state, &session, assignment).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /assignments/{id}`
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
  assignments::delete(&*state.store, &session, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}
