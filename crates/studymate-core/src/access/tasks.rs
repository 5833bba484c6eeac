//! Owner-scoped operations on tasks.

use crate::{
  Error, Result,
  access::{decode_all, load_owned},
  document::{Collection, Direction, DocumentStore, Query},
  session::Session,
  task::{NewTask, Task, TaskPatch},
};

const COLLECTION: Collection = Collection::Tasks;

/// Create an incomplete task owned by the caller and return its id.
///
/// The subject id is stored as given; it is not checked against existing
/// subjects.
pub async fn create<S: DocumentStore>(store: &S, session: &Session, input: NewTask) -> Result<String> {
  let principal = session.require()?;
  input.validate()?;

  let id = store
    .create(COLLECTION, input.into_fields(&principal.id))
    .await
    .map_err(Error::remote)?;
  tracing::debug!(task_id = %id, owner = %principal.id, "task created");
  Ok(id)
}

pub async fn get<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<Task> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?.decode()
}

async fn query<S: DocumentStore>(store: &S, query: Query) -> Result<Vec<Task>> {
  let query = query.order_by("date", Direction::Ascending);
  let docs = store.query(COLLECTION, &query).await.map_err(Error::remote)?;
  decode_all(docs)
}

/// The caller's tasks, earliest date first.
pub async fn list_mine<S: DocumentStore>(store: &S, session: &Session) -> Result<Vec<Task>> {
  let principal = session.require()?;
  query(store, Query::owned_by(&principal.id)).await
}

/// The caller's tasks with the given completion flag, earliest date first.
pub async fn list_by_status<S: DocumentStore>(
  store: &S,
  session: &Session,
  completed: bool,
) -> Result<Vec<Task>> {
  let principal = session.require()?;
  query(store, Query::owned_by(&principal.id).filter("completed", completed)).await
}

pub async fn update<S: DocumentStore>(
  store: &S,
  session: &Session,
  id: &str,
  patch: TaskPatch,
) -> Result<()> {
  let principal = session.require()?;
  patch.validate()?;
  load_owned(store, principal, COLLECTION, id).await?;

  store
    .update(COLLECTION, id, patch.into_fields())
    .await
    .map_err(Error::remote)?;
  tracing::debug!(task_id = %id, "task updated");
  Ok(())
}

pub async fn set_completed<S: DocumentStore>(
  store: &S,
  session: &Session,
  id: &str,
  completed: bool,
) -> Result<()> {
  update(store, session, id, TaskPatch::completed(completed)).await
}

pub async fn delete<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<()> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?;
  store.delete(COLLECTION, id).await.map_err(Error::remote)?;
  tracing::debug!(task_id = %id, "task deleted");
  Ok(())
}
