//! Tasks: a dated to-do item filed under a subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  Result,
  access::non_empty,
  document::{Fields, OWNER_FIELD, fields, nullable},
  timestamp,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum Priority {
  High,
  #[default]
  Medium,
  Low,
}

impl Priority {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::High => "High",
      Self::Medium => "Medium",
      Self::Low => "Low",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id:          String,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub subject_id:  String,
  /// When the task is scheduled for.
  #[serde(with = "crate::timestamp")]
  pub date:        DateTime<Utc>,
  #[serde(default)]
  pub priority:    Priority,
  #[serde(default)]
  pub completed:   bool,
  pub owner_id:    String,
}

/// Input to [`crate::access::tasks::create`]. Tasks always start incomplete.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  pub subject_id:  String,
  #[serde(with = "crate::timestamp")]
  pub date:        DateTime<Utc>,
  #[serde(default)]
  pub priority:    Priority,
}

impl NewTask {
  pub(crate) fn validate(&self) -> Result<()> { non_empty("title", &self.title) }

  pub(crate) fn into_fields(self, owner_id: &str) -> Fields {
    fields(json!({
      "title": self.title.trim(),
      "description": self.description,
      "subjectId": self.subject_id,
      "date": timestamp::encode(self.date),
      "priority": self.priority.as_str(),
      "completed": false,
      OWNER_FIELD: owner_id,
    }))
  }
}

/// Partial update for a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
  #[serde(default)]
  pub subject_id:  Option<String>,
  #[serde(default, with = "crate::timestamp::option")]
  pub date:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub priority:    Option<Priority>,
  #[serde(default)]
  pub completed:   Option<bool>,
}

impl TaskPatch {
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
    if let Some(description) = self.description {
      patch.insert(
        "description".into(),
        description.map_or(Value::Null, Value::String),
      );
    }
    if let Some(subject_id) = self.subject_id {
      patch.insert("subjectId".into(), Value::String(subject_id));
    }
    if let Some(date) = self.date {
      patch.insert("date".into(), Value::String(timestamp::encode(date)));
    }
    if let Some(priority) = self.priority {
      patch.insert("priority".into(), Value::from(priority.as_str()));
    }
    if let Some(completed) = self.completed {
      patch.insert("completed".into(), Value::Bool(completed));
    }
    patch
  }
}
