//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use uuid::Uuid;

use studymate_core::{
  document::{Collection, Document, DocumentStore, Fields, Query},
  timestamp,
};

use crate::{
  Error, Result,
  encode::{RawDocument, encode_direction, encode_fields, encode_filter_value, json_path},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A StudyMate document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `json_extract` over a field, with the path inlined as a literal so the
/// planner can match the owner index.
fn extract(field: &str) -> String {
  format!("json_extract(fields_json, '{}')", json_path(field).replace('\'', "''"))
}

/// Build the SELECT for `query` and its bound parameters. `?1` is always the
/// collection name.
fn build_select(collection: Collection, query: &Query) -> Result<(String, Vec<SqlValue>)> {
  let mut params = vec![SqlValue::Text(collection.as_str().to_owned())];
  let mut conds = vec!["collection = ?1".to_owned()];

  for (field, value) in &query.filters {
    match encode_filter_value(field, value)? {
      Some(v) => {
        params.push(v);
        conds.push(format!("{} = ?{}", extract(field), params.len()));
      }
      None => conds.push(format!("{} IS NULL", extract(field))),
    }
  }

  let order_clause = match &query.order_by {
    // Ties fall back to insertion order, in the requested direction.
    Some(order) => {
      let dir = encode_direction(order.direction);
      format!("ORDER BY {} {dir}, rowid {dir}", extract(&order.field))
    }
    None => "ORDER BY rowid".to_owned(),
  };

  let sql = format!(
    "SELECT doc_id, fields_json FROM documents WHERE {} {order_clause}",
    conds.join(" AND ")
  );
  Ok((sql, params))
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn create(&self, collection: Collection, fields: Fields) -> Result<String> {
    let id = Uuid::new_v4().hyphenated().to_string();
    self.put(collection, &id, fields).await?;
    Ok(id)
  }

  async fn put(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
    let collection_str = collection.as_str();
    let id_str         = id.to_owned();
    let fields_str     = encode_fields(&fields)?;
    let at_str         = timestamp::encode(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, fields_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (collection, doc_id) DO UPDATE
             SET fields_json = excluded.fields_json,
                 updated_at  = excluded.updated_at",
          rusqlite::params![collection_str, id_str, fields_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert(&self, collection: Collection, id: &str, fields: Fields) -> Result<bool> {
    let collection_str = collection.as_str();
    let id_str         = id.to_owned();
    let fields_str     = encode_fields(&fields)?;
    let at_str         = timestamp::encode(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO documents (collection, doc_id, fields_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (collection, doc_id) DO NOTHING",
          rusqlite::params![collection_str, id_str, fields_str, at_str],
        )?)
      })
      .await?;
    Ok(inserted == 1)
  }

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
    let collection_str = collection.as_str();
    let id_str         = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT doc_id, fields_json FROM documents
             WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection_str, id_str],
            |row| {
              Ok(RawDocument {
                doc_id:      row.get(0)?,
                fields_json: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
    let (sql, params) = build_select(collection, query)?;

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawDocument {
              doc_id:      row.get(0)?,
              fields_json: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn update(&self, collection: Collection, id: &str, patch: Fields) -> Result<()> {
    let collection_str = collection.as_str();
    let id_str         = id.to_owned();
    let patch_str      = encode_fields(&patch)?;
    let at_str         = timestamp::encode(Utc::now());

    // json_patch merges top-level keys; a null in the patch removes the key,
    // which reads back as an absent optional field.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents
           SET fields_json = json_patch(fields_json, ?3), updated_at = ?4
           WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_str, id_str, patch_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::DocumentNotFound { collection, id: id.to_owned() });
    }
    tracing::trace!(%collection, id, "document patched");
    Ok(())
  }

  async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
    let collection_str = collection.as_str();
    let id_str         = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_str, id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
