//! Owner-scoped operations on subjects.

use std::collections::HashMap;

use chrono::Utc;

use crate::{
  Error, Result,
  access::{decode_all, load_owned},
  document::{Collection, Direction, DocumentStore, Query},
  session::Session,
  subject::{NewSubject, Subject, SubjectPatch, SubjectWithTaskCount},
};

const COLLECTION: Collection = Collection::Subjects;

/// Create a subject owned by the caller and return its id.
pub async fn create<S: DocumentStore>(
  store: &S,
  session: &Session,
  input: NewSubject,
) -> Result<String> {
  let principal = session.require()?;
  input.validate()?;

  let id = store
    .create(COLLECTION, input.into_fields(&principal.id, Utc::now()))
    .await
    .map_err(Error::remote)?;
  tracing::debug!(subject_id = %id, owner = %principal.id, "subject created");
  Ok(id)
}

pub async fn get<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<Subject> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?.decode()
}

/// The caller's subjects, newest first.
pub async fn list_mine<S: DocumentStore>(store: &S, session: &Session) -> Result<Vec<Subject>> {
  let principal = session.require()?;
  let query = Query::owned_by(&principal.id).order_by("createdAt", Direction::Descending);
  let docs = store.query(COLLECTION, &query).await.map_err(Error::remote)?;
  decode_all(docs)
}

/// The caller's subjects, newest first, each with the number of the caller's
/// tasks filed under it. Tasks are fetched in one query and counted locally.
pub async fn list_with_task_count<S: DocumentStore>(
  store: &S,
  session: &Session,
) -> Result<Vec<SubjectWithTaskCount>> {
  let subjects = list_mine(store, session).await?;
  let tasks = super::tasks::list_mine(store, session).await?;

  let mut counts: HashMap<&str, usize> = HashMap::new();
  for task in &tasks {
    *counts.entry(task.subject_id.as_str()).or_default() += 1;
  }

  Ok(
    subjects
      .into_iter()
      .map(|subject| {
        let task_count = counts.get(subject.id.as_str()).copied().unwrap_or(0);
        SubjectWithTaskCount { subject, task_count }
      })
      .collect(),
  )
}

pub async fn update<S: DocumentStore>(
  store: &S,
  session: &Session,
  id: &str,
  patch: SubjectPatch,
) -> Result<()> {
  let principal = session.require()?;
  patch.validate()?;
  load_owned(store, principal, COLLECTION, id).await?;

  store
    .update(COLLECTION, id, patch.into_fields())
    .await
    .map_err(Error::remote)?;
  tracing::debug!(subject_id = %id, "subject updated");
  Ok(())
}

/// Delete a subject. Refuses with [`Error::HasDependents`] while any of the
/// caller's tasks still reference it; nothing cascades.
pub async fn delete<S: DocumentStore>(store: &S, session: &Session, id: &str) -> Result<()> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, id).await?;

  let dependents = Query::owned_by(&principal.id).filter("subjectId", id);
  let tasks = store
    .query(Collection::Tasks, &dependents)
    .await
    .map_err(Error::remote)?;
  if !tasks.is_empty() {
    return Err(Error::HasDependents { subject_id: id.to_owned(), tasks: tasks.len() });
  }

  store.delete(COLLECTION, id).await.map_err(Error::remote)?;
  tracing::debug!(subject_id = %id, "subject deleted");
  Ok(())
}
