//! Instant encoding shared by every stored document.
//!
//! Instants are stored as RFC 3339 UTC strings with a fixed millisecond
//! precision, so a store that orders by string comparison also orders
//! chronologically.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn encode(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// `#[serde(with = "crate::timestamp")]` adaptor.
pub fn serialize<S: Serializer>(
  dt: &DateTime<Utc>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&encode(*dt))
}

pub fn deserialize<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
  let s = String::deserialize(deserializer)?;
  decode(&s).map_err(serde::de::Error::custom)
}

/// Same encoding for optional instants; absent or `null` decodes to `None`.
pub mod option {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match dt {
      Some(dt) => serializer.serialize_str(&super::encode(*dt)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
      .map(|s| super::decode(&s).map_err(serde::de::Error::custom))
      .transpose()
  }
}
