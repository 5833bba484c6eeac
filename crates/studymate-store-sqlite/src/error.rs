//! Error type for `studymate-store-sqlite`.

use studymate_core::document::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Attempted to update a document that does not exist.
  #[error("{collection} not found: {id}")]
  DocumentNotFound { collection: Collection, id: String },

  /// Filters compare scalars only; objects and arrays are rejected.
  #[error("unsupported filter value for field {0:?}")]
  UnsupportedFilter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
