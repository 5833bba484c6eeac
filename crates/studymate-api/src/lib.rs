//! JSON REST API for StudyMate.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`], [`BlobStore`]
//! and [`Authenticator`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", studymate_api::api_router(state))
//! ```

pub mod assignments;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod profile;
pub mod session;
pub mod subjects;
pub mod tasks;

use std::{
  collections::HashSet,
  sync::{Arc, Mutex, PoisonError},
};

use axum::{
  Router,
  routing::{get, post, put},
};
use studymate_core::{
  access::{SubjectNameCache, profiles},
  blob::BlobStore,
  document::DocumentStore,
  session::Session,
};

pub use error::ApiError;
pub use session::{Authenticator, CurrentSession};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, B, A> {
  pub store:  Arc<S>,
  pub blobs:  Arc<B>,
  pub auth:   Arc<A>,
  /// Subject names shown next to tasks and assignments.
  pub names:  Arc<SubjectNameCache>,
  /// Principals whose profile has been ensured by this process.
  known:      Arc<Mutex<HashSet<String>>>,
}

impl<S, B, A> Clone for ApiState<S, B, A> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      blobs:     self.blobs.clone(),
      auth:      self.auth.clone(),
      names:     self.names.clone(),
      known:     self.known.clone(),
    }
  }
}

impl<S, B, A> ApiState<S, B, A>
where
  S: DocumentStore,
  B: BlobStore,
  A: Authenticator,
{
  pub fn new(store: Arc<S>, blobs: Arc<B>, auth: Arc<A>) -> Self {
    Self {
      store,
      blobs,
      auth,
      names: Arc::new(SubjectNameCache::new()),
      known: Arc::default(),
    }
  }

  /// Create the principal's profile the first time they are seen.
  async fn signed_in(&self, session: &Session) -> Result<(), ApiError> {
    let Some(principal) = session.principal() else {
      return Ok(());
    };
    let seen = self
      .known
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains(&principal.id);
    if seen {
      return Ok(());
    }

    profiles::ensure_exists(&*self.store, session, None).await?;
    self
      .known
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(principal.id.clone());
    tracing::debug!(principal = %principal.id, "session started");
    Ok(())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B, A>(state: ApiState<S, B, A>) -> Router<()>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  Router::new()
    // Subjects
    .route("/subjects", get(subjects::list::<S, B, A>).post(subjects::create::<S, B, A>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S, B, A>)
        .patch(subjects::update::<S, B, A>)
        .delete(subjects::delete::<S, B, A>),
    )
    // Tasks
    .route("/tasks", get(tasks::list::<S, B, A>).post(tasks::create::<S, B, A>))
    .route(
      "/tasks/{id}",
      get(tasks::get_one::<S, B, A>)
        .patch(tasks::update::<S, B, A>)
        .delete(tasks::delete::<S, B, A>),
    )
    .route("/tasks/{id}/completed", post(tasks::set_completed::<S, B, A>))
    // Assignments
    .route(
      "/assignments",
      get(assignments::list::<S, B, A>).post(assignments::create::<S, B, A>),
    )
    .route(
      "/assignments/{id}",
      get(assignments::get_one::<S, B, A>)
        .patch(assignments::update::<S, B, A>)
        .delete(assignments::delete::<S, B, A>),
    )
    .route("/assignments/{id}/completed", post(assignments::set_completed::<S, B, A>))
    // Profile
    .route("/profile", get(profile::get_mine::<S, B, A>).patch(profile::update::<S, B, A>))
    .route("/profile/avatar", put(profile::upload_avatar::<S, B, A>))
    // Dashboard
    .route("/dashboard", get(dashboard::handler::<S, B, A>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
