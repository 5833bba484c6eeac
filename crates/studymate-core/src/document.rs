//! The document-client contract and its query types.
//!
//! Every entity lives as a JSON object in one of four collections. The
//! [`DocumentStore`] trait is implemented by storage backends (e.g.
//! `studymate-store-sqlite`, or [`crate::memory::MemoryStore`]); the access
//! layer depends on this abstraction, never on a concrete backend.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The field map of a document, without its id.
pub type Fields = Map<String, Value>;

/// The name of the field holding the owning principal's id.
pub const OWNER_FIELD: &str = "ownerId";

// ─── Collections ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  Subjects,
  Tasks,
  Assignments,
  Profiles,
}

impl Collection {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Subjects => "subjects",
      Self::Tasks => "tasks",
      Self::Assignments => "assignments",
      Self::Profiles => "profiles",
    }
  }

  /// Singular noun used in error messages.
  pub fn entity(self) -> &'static str {
    match self {
      Self::Subjects => "subject",
      Self::Tasks => "task",
      Self::Assignments => "assignment",
      Self::Profiles => "profile",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.entity())
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A stored document: a store-assigned id plus its JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:     String,
  pub fields: Fields,
}

impl Document {
  /// The owning principal's id, if the document carries one.
  pub fn owner_id(&self) -> Option<&str> {
    self.fields.get(OWNER_FIELD).and_then(Value::as_str)
  }

  /// Decode into an entity type. The document id is injected as `"id"` so
  /// entity structs can deserialize it like any other field.
  pub fn decode<T: serde::de::DeserializeOwned>(self) -> crate::Result<T> {
    let mut fields = self.fields;
    fields.insert("id".to_owned(), Value::String(self.id));
    Ok(serde_json::from_value(Value::Object(fields))?)
  }
}

/// Unwrap a `json!({ ... })` literal into [`Fields`].
pub(crate) fn fields(value: Value) -> Fields {
  match value {
    Value::Object(map) => map,
    _ => Fields::new(),
  }
}

/// Deserialize a patch field where absent means "leave alone" and `null`
/// means "clear". Use with `#[serde(default, deserialize_with = "...")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// Parameters for [`DocumentStore::query`]: conjunctive equality filters and
/// an optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
  pub filters:  Vec<(String, Value)>,
  pub order_by: Option<OrderBy>,
}

impl Query {
  /// A query scoped to documents owned by `owner_id`.
  pub fn owned_by(owner_id: &str) -> Self {
    Self::default().filter(OWNER_FIELD, owner_id)
  }

  pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
    self.filters.push((field.to_owned(), value.into()));
    self
  }

  pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
    self.order_by = Some(OrderBy { field: field.to_owned(), direction });
    self
  }

  /// Whether `fields` satisfies every equality filter.
  pub fn matches(&self, fields: &Fields) -> bool {
    self
      .filters
      .iter()
      .all(|(field, value)| fields.get(field) == Some(value))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a hosted document database.
///
/// The store knows nothing about ownership; every owner check happens in
/// [`crate::access`]. All methods return `Send` futures so the trait can be
/// used from multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new document and return its store-assigned id.
  fn create(
    &self,
    collection: Collection,
    fields: Fields,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Create or replace the document at a caller-supplied id.
  ///
  /// Used for profiles, whose id is the owning principal's id.
  fn put<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    fields: Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Create the document at `id` only if none exists there yet.
  ///
  /// Returns `false`, leaving the existing document untouched, when the id
  /// is taken. Lazy creation relies on this being atomic.
  fn insert<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    fields: Fields,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Return every document matching `query`, in the requested order.
  fn query<'a>(
    &'a self,
    collection: Collection,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Shallow-merge `patch` into an existing document. A `null` value removes
  /// the key.
  ///
  /// Returns an error if the document does not exist.
  fn update<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    patch: Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a document. Deleting an absent document is not an error.
  fn delete<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
