//! Error types for `studymate-core`.

use thiserror::Error;

use crate::document::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not authenticated")]
  NotAuthenticated,

  #[error("{collection} not found: {id}")]
  NotFound { collection: Collection, id: String },

  #[error("unauthorized")]
  Unauthorized,

  #[error("subject {subject_id} still has {tasks} task(s) referencing it")]
  HasDependents { subject_id: String, tasks: usize },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Transport or service failure from a remote collaborator.
  #[error("remote failure: {0}")]
  Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("malformed document: {0}")]
  Decode(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a collaborator error as [`Error::Remote`].
  pub fn remote<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Remote(Box::new(e))
  }

  pub(crate) fn not_found(collection: Collection, id: &str) -> Self {
    Self::NotFound { collection, id: id.to_owned() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
