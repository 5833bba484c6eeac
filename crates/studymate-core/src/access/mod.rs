//! The entity access layer.
//!
//! Each submodule wraps a [`DocumentStore`] for one entity with owner scoping
//! and input validation. Every operation takes the caller's [`Session`]
//! explicitly and fails with [`Error::NotAuthenticated`] before touching the
//! store when the session is anonymous.
//!
//! [`Session`]: crate::session::Session

pub mod assignments;
pub mod names;
pub mod profiles;
pub mod subjects;
pub mod tasks;

pub use names::SubjectNameCache;

use crate::{
  Error, Result,
  document::{Collection, Document, DocumentStore},
  session::Principal,
};

/// Reject blank names and titles.
pub(crate) fn non_empty(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(())
}

/// Fetch a document and check that `principal` owns it.
pub(crate) async fn load_owned<S: DocumentStore>(
  store: &S,
  principal: &Principal,
  collection: Collection,
  id: &str,
) -> Result<Document> {
  let doc = store
    .get(collection, id)
    .await
    .map_err(Error::remote)?
    .ok_or_else(|| Error::not_found(collection, id))?;

  if doc.owner_id() != Some(principal.id.as_str()) {
    tracing::debug!(%collection, id, principal = %principal.id, "ownership check failed");
    return Err(Error::Unauthorized);
  }
  Ok(doc)
}

/// Decode every document, failing on the first malformed one.
pub(crate) fn decode_all<T: serde::de::DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>> {
  docs.into_iter().map(Document::decode).collect()
}
