//! Encoding helpers between core document types and SQLite columns.
//!
//! Field maps are stored as compact JSON text. Filter values are bound as the
//! SQL scalar that `json_extract` yields for the same JSON value, so equality
//! comparisons line up: strings as TEXT, integers as INTEGER, floats as REAL,
//! booleans as 0/1.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use studymate_core::document::{Direction, Document, Fields};

use crate::{Error, Result};

pub fn encode_fields(fields: &Fields) -> Result<String> { Ok(serde_json::to_string(fields)?) }

pub fn decode_fields(s: &str) -> Result<Fields> { Ok(serde_json::from_str(s)?) }

/// JSON path selecting a top-level field. Plain identifiers stay unquoted so
/// the path matches the owner index expression; anything else is quoted.
pub fn json_path(field: &str) -> String {
  if field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    format!("$.{field}")
  } else {
    format!("$.\"{}\"", field.replace('"', "\\\""))
  }
}

/// The SQL scalar to compare `json_extract(...)` against; `None` for JSON
/// `null`, which must be matched with `IS NULL`.
pub fn encode_filter_value(field: &str, value: &Value) -> Result<Option<SqlValue>> {
  match value {
    Value::Null => Ok(None),
    Value::Bool(b) => Ok(Some(SqlValue::Integer(i64::from(*b)))),
    Value::Number(n) => match n.as_i64() {
      Some(i) => Ok(Some(SqlValue::Integer(i))),
      None => Ok(n.as_f64().map(SqlValue::Real)),
    },
    Value::String(s) => Ok(Some(SqlValue::Text(s.clone()))),
    Value::Array(_) | Value::Object(_) => Err(Error::UnsupportedFilter(field.to_owned())),
  }
}

pub fn encode_direction(d: Direction) -> &'static str {
  match d {
    Direction::Ascending => "ASC",
    Direction::Descending => "DESC",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id:      String,
  pub fields_json: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    Ok(Document { id: self.doc_id, fields: decode_fields(&self.fields_json)? })
  }
}
