//! Subjects: a course or topic that tasks and assignments are filed under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  Result,
  access::non_empty,
  document::{Fields, OWNER_FIELD, fields, nullable},
  timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:         String,
  #[serde(default)]
  pub name:       String,
  /// Display colour, typically a `#rrggbb` hex string.
  #[serde(default)]
  pub color:      Option<String>,
  pub owner_id:   String,
  #[serde(default, with = "crate::timestamp::option")]
  pub created_at: Option<DateTime<Utc>>,
}

/// A subject together with the number of tasks filed under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectWithTaskCount {
  #[serde(flatten)]
  pub subject:    Subject,
  pub task_count: usize,
}

/// Input to [`crate::access::subjects::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
  pub name:  String,
  #[serde(default)]
  pub color: Option<String>,
}

impl NewSubject {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), color: None }
  }

  pub(crate) fn validate(&self) -> Result<()> { non_empty("name", &self.name) }

  pub(crate) fn into_fields(self, owner_id: &str, now: DateTime<Utc>) -> Fields {
    fields(json!({
      "name": self.name.trim(),
      "color": self.color,
      OWNER_FIELD: owner_id,
      "createdAt": timestamp::encode(now),
    }))
  }
}

/// Partial update for a subject. Absent fields are left untouched; an
/// explicit `null` colour clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectPatch {
  #[serde(default)]
  pub name:  Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub color: Option<Option<String>>,
}

impl SubjectPatch {
  pub(crate) fn validate(&self) -> Result<()> {
    match &self.name {
      Some(name) => non_empty("name", name),
      None => Ok(()),
    }
  }

  pub(crate) fn into_fields(self) -> Fields {
    let mut patch = Fields::new();
    if let Some(name) = self.name {
      patch.insert("name".into(), Value::String(name.trim().to_owned()));
    }
    if let Some(color) = self.color {
      patch.insert("color".into(), color.map_or(Value::Null, Value::String));
    }
    patch
  }
}
