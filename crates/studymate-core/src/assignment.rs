//! Assignments: graded work with a due date, filed under a subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  Result,
  access::non_empty,
  document::{Fields, OWNER_FIELD, fields},
  timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  pub id:         String,
  #[serde(default)]
  pub title:      String,
  #[serde(with = "crate::timestamp")]
  pub due_date:   DateTime<Utc>,
  #[serde(default)]
  pub subject_id: String,
  #[serde(default)]
  pub completed:  bool,
  pub owner_id:   String,
  #[serde(default, with = "crate::timestamp::option")]
  pub created_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::access::assignments::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
  pub title:      String,
  #[serde(with = "crate::timestamp")]
  pub due_date:   DateTime<Utc>,
  pub subject_id: String,
}

impl NewAssignment {
  pub(crate) fn validate(&self) -> Result<()> { non_empty("title", &self.title) }

  pub(crate) fn into_fields(self, owner_id: &str, now: DateTime<Utc>) -> Fields {
    fields(json!({
      "title": self.title.trim(),
      "dueDate": timestamp::encode(self.due_date),
      "subjectId": self.subject_id,
      "completed": false,
      OWNER_FIELD: owner_id,
      "createdAt": timestamp::encode(now),
    }))
  }
}

/// Partial update for an assignment. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
  #[serde(default)]
  pub title:      Option<String>,
  #[serde(default, with = "crate::timestamp::option")]
  pub due_date:   Option<DateTime<Utc>>,
  #[serde(default)]
  pub subject_id: Option<String>,
  #[serde(default)]
  pub completed:  Option<bool>,
}

impl AssignmentPatch {
  pub fn completed(completed: bool) -> Self {
    Self { completed: Some(completed), ..Self::default() }
  }

  pub(crate) fn validate(&self) -> Result<()> {
    match &self.title {
      Some(title) => non_empty("title", title),
      None => Ok(()),
    }
  }

  pub(crate) fn into_fields(self) -> Fields {
    let mut patch = Fields::new();
    if let Some(title) = self.title {
      patch.insert("title".into(), Value::String(title.trim().to_owned()));
    }
    if let Some(due_date) = self.due_date {
      patch.insert("dueDate".into(), Value::String(timestamp::encode(due_date)));
    }
    if let Some(subject_id) = self.subject_id {
      patch.insert("subjectId".into(), Value::String(subject_id));
    }
    if let Some(completed) = self.completed {
      patch.insert("completed".into(), Value::Bool(completed));
    }
    patch
  }
}
