//! [`MemoryStore`]: a process-local [`DocumentStore`].
//!
//! Backs the access-layer and API tests, and is handy for embedding. Cloning
//! is cheap; clones share the same documents.

use std::{
  cmp::Ordering,
  collections::{BTreeMap, HashMap},
  sync::{
    Arc, RwLock,
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
  },
};

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::document::{
  Collection, Direction, Document, DocumentStore, Fields, Query,
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("document not found: {0}")]
  NotFound(String),

  #[error("store lock poisoned")]
  Poisoned,
}

/// A document's fields plus its insertion sequence, used to break ties when
/// sorting.
#[derive(Debug, Clone)]
struct Stored {
  seq:    u64,
  fields: Fields,
}

type Collections = HashMap<Collection, BTreeMap<String, Stored>>;

#[derive(Debug, Default)]
struct State {
  collections: Collections,
  next_seq:    u64,
}

impl State {
  fn store(&mut self, collection: Collection, id: &str, fields: Fields) {
    let seq = self.next_seq;
    self.next_seq += 1;
    let docs = self.collections.entry(collection).or_default();
    match docs.get_mut(id) {
      // Replacing keeps the original position, as a SQLite upsert keeps its rowid.
      Some(existing) => existing.fields = fields,
      None => {
        docs.insert(id.to_owned(), Stored { seq, fields });
      }
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<State>>,
  calls: Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of trait calls served so far.
  pub fn calls(&self) -> usize { self.calls.load(AtomicOrdering::SeqCst) }

  fn touch(&self) { self.calls.fetch_add(1, AtomicOrdering::SeqCst); }

  fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> Result<T, MemoryError> {
    self.touch();
    let guard = self.state.read().map_err(|_| MemoryError::Poisoned)?;
    Ok(f(&guard.collections))
  }

  fn write<T>(
    &self,
    f: impl FnOnce(&mut State) -> Result<T, MemoryError>,
  ) -> Result<T, MemoryError> {
    self.touch();
    let mut guard = self.state.write().map_err(|_| MemoryError::Poisoned)?;
    f(&mut guard)
  }
}

/// Order two optional field values: absent first, then by JSON type.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
    (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
    (Some(Value::Number(a)), Some(Value::Number(b))) => a
      .as_f64()
      .partial_cmp(&b.as_f64())
      .unwrap_or(Ordering::Equal),
    _ => Ordering::Equal,
  }
}

impl DocumentStore for MemoryStore {
  type Error = MemoryError;

  async fn create(&self, collection: Collection, fields: Fields) -> Result<String, MemoryError> {
    let id = Uuid::new_v4().hyphenated().to_string();
    self.write(|state| {
      state.store(collection, &id, fields);
      Ok(())
    })?;
    Ok(id)
  }

  async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), MemoryError> {
    self.write(|state| {
      state.store(collection, id, fields);
      Ok(())
    })
  }

  async fn insert(
    &self,
    collection: Collection,
    id: &str,
    fields: Fields,
  ) -> Result<bool, MemoryError> {
    self.write(|state| {
      let exists = state
        .collections
        .get(&collection)
        .is_some_and(|docs| docs.contains_key(id));
      if !exists {
        state.store(collection, id, fields);
      }
      Ok(!exists)
    })
  }

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, MemoryError> {
    self.read(|docs| {
      docs
        .get(&collection)
        .and_then(|c| c.get(id))
        .map(|stored| Document { id: id.to_owned(), fields: stored.fields.clone() })
    })
  }

  async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, MemoryError> {
    let mut found: Vec<(u64, Document)> = self.read(|docs| {
      docs
        .get(&collection)
        .map(|c| {
          c.iter()
            .filter(|(_, stored)| query.matches(&stored.fields))
            .map(|(id, stored)| {
              (stored.seq, Document { id: id.clone(), fields: stored.fields.clone() })
            })
            .collect()
        })
        .unwrap_or_default()
    })?;

    match &query.order_by {
      Some(order) => found.sort_by(|(seq_a, a), (seq_b, b)| {
        let ord = compare_values(a.fields.get(&order.field), b.fields.get(&order.field))
          .then(seq_a.cmp(seq_b));
        match order.direction {
          Direction::Ascending => ord,
          Direction::Descending => ord.reverse(),
        }
      }),
      None => found.sort_by_key(|(seq, _)| *seq),
    }

    Ok(found.into_iter().map(|(_, doc)| doc).collect())
  }

  async fn update(&self, collection: Collection, id: &str, patch: Fields) -> Result<(), MemoryError> {
    self.write(|state| {
      let stored = state
        .collections
        .get_mut(&collection)
        .and_then(|c| c.get_mut(id))
        .ok_or_else(|| MemoryError::NotFound(id.to_owned()))?;
      for (key, value) in patch {
        if value.is_null() {
          stored.fields.remove(&key);
        } else {
          stored.fields.insert(key, value);
        }
      }
      Ok(())
    })
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<(), MemoryError> {
    self.write(|state| {
      if let Some(c) = state.collections.get_mut(&collection) {
        c.remove(id);
      }
      Ok(())
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::document::fields;

  #[tokio::test]
  async fn query_orders_and_filters() {
    let store = MemoryStore::new();
    for (owner, date) in [("u1", "2024-03-02"), ("u1", "2024-03-01"), ("u2", "2024-03-03")] {
      store
        .create(Collection::Tasks, fields(json!({ "ownerId": owner, "date": date })))
        .await
        .unwrap();
    }

    let q = Query::owned_by("u1").order_by("date", Direction::Ascending);
    let docs = store.query(Collection::Tasks, &q).await.unwrap();
    let dates: Vec<_> = docs.iter().map(|d| d.fields["date"].as_str().unwrap()).collect();
    assert_eq!(dates, ["2024-03-01", "2024-03-02"]);
  }

  #[tokio::test]
  async fn update_merges_and_requires_existing() {
    let store = MemoryStore::new();
    let id = store
      .create(Collection::Subjects, fields(json!({ "name": "Maths", "color": "#fff" })))
      .await
      .unwrap();

    store
      .update(Collection::Subjects, &id, fields(json!({ "name": "Algebra" })))
      .await
      .unwrap();
    let doc = store.get(Collection::Subjects, &id).await.unwrap().unwrap();
    assert_eq!(doc.fields["name"], "Algebra");
    assert_eq!(doc.fields["color"], "#fff");

    let missing = store.update(Collection::Subjects, "nope", Fields::new()).await;
    assert!(matches!(missing, Err(MemoryError::NotFound(_))));
  }

  #[tokio::test]
  async fn ties_keep_insertion_order_in_either_direction() {
    let store = MemoryStore::new();
    for name in ["first", "second", "third"] {
      store
        .create(
          Collection::Subjects,
          fields(json!({ "ownerId": "u1", "name": name, "createdAt": "2024-03-01" })),
        )
        .await
        .unwrap();
    }

    let names = |docs: Vec<Document>| -> Vec<String> {
      docs.iter().map(|d| d.fields["name"].as_str().unwrap().to_owned()).collect()
    };
    let newest = Query::owned_by("u1").order_by("createdAt", Direction::Descending);
    let oldest = Query::owned_by("u1").order_by("createdAt", Direction::Ascending);
    assert_eq!(names(store.query(Collection::Subjects, &newest).await.unwrap()), [
      "third", "second", "first"
    ]);
    assert_eq!(names(store.query(Collection::Subjects, &oldest).await.unwrap()), [
      "first", "second", "third"
    ]);
  }

  #[tokio::test]
  async fn insert_never_overwrites() {
    let store = MemoryStore::new();
    let first = fields(json!({ "name": "original" }));
    assert!(store.insert(Collection::Profiles, "u1", first).await.unwrap());

    let second = fields(json!({ "name": "replacement" }));
    assert!(!store.insert(Collection::Profiles, "u1", second).await.unwrap());

    let doc = store.get(Collection::Profiles, "u1").await.unwrap().unwrap();
    assert_eq!(doc.fields["name"], "original");
  }
}
