//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | Optional `?with_task_count=true` |
//! | `POST`   | `/subjects` | Body: `{"name":"Physics","color":"#3366ff"}`; returns 201 + `{"id":...}` |
//! | `GET`    | `/subjects/{id}` | 404 if not found, 403 if not yours |
//! | `PATCH`  | `/subjects/{id}` | Body: [`SubjectPatch`]; returns the updated subject |
//! | `DELETE` | `/subjects/{id}` | 409 while tasks reference it |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use studymate_core::{
  access::subjects,
  blob::BlobStore,
  document::DocumentStore,
  subject::{NewSubject, Subject, SubjectPatch},
};

use crate::{
  ApiState, Authenticator, CurrentSession,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub with_task_count: bool,
}

/// `GET /subjects[?with_task_count=true]`
pub async fn list<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  if params.with_task_count {
    let subjects = subjects::list_with_task_count(store, &session).await?;
    Ok(Json(subjects).into_response())
  } else {
    let subjects = subjects::list_mine(store, &session).await?;
    Ok(Json(subjects).into_response())
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subjects`
pub async fn create<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  JsonBody(body): JsonBody<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let id = subjects::create(&*state.store, &session, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/{id}`
pub async fn get_one<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
) -> Result<Json<Subject>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  Ok(Json(subjects::get(&*state.store, &session, &id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /subjects/{id}`
pub async fn update<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  Path(id): Path<String>,
  JsonBody(patch): JsonBody<SubjectPatch>,
) -> Result<Json<Subject>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let store = &*state.store;
  subjects::update(store, &session, &id, patch).await?;
  if let Some(principal) = session.principal() {
    state.names.invalidate(&principal.id, &id);
  }
  Ok(Json(subjects::get(store, &session, &id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subjects/{id}`
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
  subjects::delete(&*state.store, &session, &id).await?;
  if let Some(principal) = session.principal() {
    state.names.invalidate(&principal.id, &id);
  }
  Ok(StatusCode::NO_CONTENT)
}
