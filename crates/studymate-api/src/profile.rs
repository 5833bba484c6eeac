//! Handlers for `/profile` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/profile` | The caller's profile |
//! | `PATCH` | `/profile` | Body: [`ProfilePatch`] |
//! | `PUT`   | `/profile/avatar` | Raw image body; `Content-Type: image/*` required |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use bytes::Bytes;
use serde_json::{Value, json};
use studymate_core::{
  access::profiles,
  blob::BlobStore,
  document::DocumentStore,
  profile::{Profile, ProfilePatch},
};

use crate::{
  ApiState, Authenticator, CurrentSession, error::ApiError, extract::JsonBody,
};

/// `GET /profile`
pub async fn get_mine<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
) -> Result<Json<Profile>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  Ok(Json(profiles::get_mine(&*state.store, &session).await?))
}

/// `PATCH /profile`
pub async fn update<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  JsonBody(patch): JsonBody<ProfilePatch>,
) -> Result<Json<Profile>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  Ok(Json(profiles::update_mine(&*state.store, &session, patch).await?))
}

/// `PUT /profile/avatar`: returns `{"photoUrl": "..."}`.
pub async fn upload_avatar<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::BadRequest("missing Content-Type".into()))?;

  let url = profiles::upload_avatar(
    &*state.store,
    &*state.blobs,
    &session,
    body.to_vec(),
    content_type,
  )
  .await?;
  Ok(Json(json!({ "photoUrl": url })))
}
