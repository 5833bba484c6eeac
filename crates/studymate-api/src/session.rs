//! Request authentication.
//!
//! The API never decides *how* callers authenticate; it asks an
//! [`Authenticator`] to turn request headers into a [`Session`]. Anonymous
//! sessions are passed through and rejected by the access layer.

use std::future::Future;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use studymate_core::{blob::BlobStore, document::DocumentStore, session::Session};

use crate::{ApiState, error::ApiError};

/// Resolves request credentials to the current principal.
pub trait Authenticator: Send + Sync {
  fn authenticate<'a>(
    &'a self,
    headers: &'a HeaderMap,
  ) -> impl Future<Output = Session> + Send + 'a;
}

/// The caller's session, extracted from request headers.
///
/// The first time a principal is seen by this process, their profile is
/// created if it does not exist yet.
pub struct CurrentSession(pub Session);

impl<S, B, A> FromRequestParts<ApiState<S, B, A>> for CurrentSession
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, B, A>,
  ) -> Result<Self, Self::Rejection> {
    let session = state.auth.authenticate(&parts.headers).await;
    if session.principal().is_some() {
      state.signed_in(&session).await?;
    }
    Ok(CurrentSession(session))
  }
}
