//! Profiles, one per principal, keyed by the principal's id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  Result,
  access::non_empty,
  document::{Fields, OWNER_FIELD, fields, nullable},
  session::Principal,
  timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  /// Always equal to `owner_id`.
  pub id:         String,
  #[serde(default)]
  pub name:       String,
  #[serde(default)]
  pub email:      String,
  #[serde(default)]
  pub photo_url:  Option<String>,
  pub owner_id:   String,
  #[serde(default, with = "crate::timestamp::option")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, with = "crate::timestamp::option")]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Fields of a freshly created profile, seeded from the principal.
pub(crate) fn initial_fields(
  principal: &Principal,
  name: Option<String>,
  now: DateTime<Utc>,
) -> Fields {
  let name = name
    .or_else(|| principal.display_name.clone())
    .unwrap_or_default();
  fields(json!({
    "name": name,
    "email": principal.email.clone().unwrap_or_default(),
    "photoUrl": principal.photo_url,
    OWNER_FIELD: principal.id,
    "createdAt": timestamp::encode(now),
    "updatedAt": timestamp::encode(now),
  }))
}

/// Partial update for the caller's profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  #[serde(default)]
  pub name:      Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub photo_url: Option<Option<String>>,
}

impl ProfilePatch {
  pub(crate) fn validate(&self) -> Result<()> {
    match &self.name {
      Some(name) => non_empty("name", name),
      None => Ok(()),
    }
  }

  pub(crate) fn into_fields(self, now: DateTime<Utc>) -> Fields {
    let mut patch = Fields::new();
    if let Some(name) = self.name {
      patch.insert("name".into(), Value::String(name.trim().to_owned()));
    }
    if let Some(photo_url) = self.photo_url {
      patch.insert("photoUrl".into(), photo_url.map_or(Value::Null, Value::String));
    }
    patch.insert("updatedAt".into(), Value::String(timestamp::encode(now)));
    patch
  }
}
