//! Owner-scoped operations on assignments.

use chrono::Utc;

use crate::{
  Error, Result,
  access::{decode_all, load_owned},
  assignment::{Assignment, AssignmentPatch, NewAssignment},
  document::{Collection, Direction, DocumentStore, Query},
  session::Session,
};

const COLLECTION: Collection = Collection::Assignments;

/// Create an incomplete assignment owned by the caller and return its id.
pub async fn create<S: DocumentStore>(
  store: &S,
  session: &Session,
  input: NewAssignment,
) -> Result<String> {
  let principal = session.require()?;
  input.validate()?;

  let id = store
    .create(COLLECTION, input.into_fields(&principal.id, Utc::now()))
    .await
    .map_err(Error::remote)?;
  tracing::debug!(assignment_id = %id, owner = %principal.id, "assignment created");
  Ok(id)
}

pub async fn get<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<Assignment> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?.decode()
}

async fn query<S: DocumentStore>(store: &S, query: Query) -> Result<Vec<Assignment>> {
  let query = query.order_by("createdAt", Direction::Descending);
  let docs = store.query(COLLECTION, &query).await.map_err(Error::remote)?;
  decode_all(docs)
}

/// The caller's assignments, most recently created first.
pub async fn list_mine<S: DocumentStore>(store: &S, session: &Session) -> Result<Vec<Assignment>> {
  let principal = session.require()?;
  query(store, Query::owned_by(&principal.id)).await
}

/// The caller's assignments filed under `subject_id`, most recent first.
pub async fn list_by_subject<S: DocumentStore>(
  store: &S,
  session: &Session,
  subject_id: &str,
) -> Result<Vec<Assignment>> {
  let principal = session.require()?;
  query(store, Query::owned_by(&principal.id).filter("subjectId", subject_id)).await
}

pub async fn update<S: DocumentStore>(
  store: &S,
  session: &Session,
  id: &str,
  patch: AssignmentPatch,
) -> Result<()> {
  let principal = session.require()?;
  patch.validate()?;
  load_owned(store, principal, COLLECTION, id).await?;

  store
    .update(COLLECTION, id, patch.into_fields())
    .await
    .map_err(Error::remote)?;
  tracing::debug!(assignment_id = %id, "assignment updated");
  Ok(())
}

pub async fn set_completed<S: DocumentStore>(
  store: &S,
  session: &Session,
  id: &str,
  completed: bool,
) -> Result<()> {
  update(store, session, id, AssignmentPatch::completed(completed)).await
}

pub async fn delete<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<()> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?;
  store.delete(COLLECTION, id).await.map_err(Error::remote)?;
  tracing::debug!(assignment_id = %id, "assignment deleted");
  Ok(())
}
