//! A per-principal cache of subject names for list views.

use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock},
};

use crate::{
  Result,
  access::subjects,
  document::DocumentStore,
  schedule::{Schedulable, UNKNOWN_SUBJECT, resolve_names},
  session::Session,
};

/// Caches `(owner, subject id) -> name`. Entries must be invalidated when a
/// subject is renamed or deleted.
#[derive(Debug, Default)]
pub struct SubjectNameCache {
  names: RwLock<HashMap<(String, String), String>>,
}

impl SubjectNameCache {
  pub fn new() -> Self { Self::default() }

  /// Names for every subject referenced by `items`. Misses are looked up
  /// through the store once each; failed lookups read `"Unknown"` and are
  /// not cached.
  pub async fn resolve<S, T>(
    &self,
    store: &S,
    session: &Session,
    items: &[T],
  ) -> Result<HashMap<String, String>>
  where
    S: DocumentStore,
    T: Schedulable,
  {
    let owner = session.require()?.id.clone();

    let mut resolved = HashMap::new();
    let mut misses = Vec::new();
    {
      let cache = self.names.read().unwrap_or_else(PoisonError::into_inner);
      for item in items {
        let key = (owner.clone(), item.subject_id().to_owned());
        match cache.get(&key) {
          Some(name) => {
            resolved.insert(key.1, name.clone());
          }
          None => misses.push(item),
        }
      }
    }

    if misses.is_empty() {
      return Ok(resolved);
    }

    let fetched = resolve_names(&misses, |id| async move {
      subjects::get(store, session, &id).await.map(|s| s.name)
    })
    .await;

    let mut cache = self.names.write().unwrap_or_else(PoisonError::into_inner);
    for (id, name) in fetched {
      if name != UNKNOWN_SUBJECT {
        cache.insert((owner.clone(), id.clone()), name.clone());
      }
      resolved.insert(id, name);
    }
    Ok(resolved)
  }

  pub fn invalidate(&self, owner_id: &str, subject_id: &str) {
    self
      .names
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&(owner_id.to_owned(), subject_id.to_owned()));
  }

  pub fn len(&self) -> usize {
    self.names.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}
