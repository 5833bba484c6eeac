//! HTTP Basic authentication against the users listed in the config file.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use studymate_api::Authenticator;
use studymate_core::session::{Principal, Session};

/// One account allowed to sign in.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
  /// Stable principal id; owns every record this user creates.
  pub id:            String,
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub display_name:  Option<String>,
  #[serde(default)]
  pub email:         Option<String>,
}

impl UserConfig {
  fn principal(&self) -> Principal {
    Principal {
      id:           self.id.clone(),
      display_name: self.display_name.clone(),
      email:        self.email.clone(),
      photo_url:    None,
    }
  }
}

/// Resolves `Authorization: Basic …` to one of the configured users.
#[derive(Debug, Clone)]
pub struct BasicAuth {
  users: Vec<UserConfig>,
}

impl BasicAuth {
  pub fn new(users: Vec<UserConfig>) -> Self { Self { users } }

  /// The user whose credentials are in `headers`, if they check out.
  pub fn verify(&self, headers: &HeaderMap) -> Option<&UserConfig> {
    let encoded = headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())?
      .strip_prefix("Basic ")?;

    let decoded = B64.decode(encoded).ok()?;
    let creds = std::str::from_utf8(&decoded).ok()?;
    let (username, password) = creds.split_once(':')?;

    let user = self.users.iter().find(|u| u.username == username)?;
    let parsed_hash = PasswordHash::new(&user.password_hash).ok()?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .ok()?;
    Some(user)
  }
}

impl Authenticator for BasicAuth {
  async fn authenticate(&self, headers: &HeaderMap) -> Session {
    match self.verify(headers) {
      Some(user) => Session::Authenticated(user.principal()),
      None => {
        if headers.contains_key(header::AUTHORIZATION) {
          tracing::debug!("rejected credentials");
        }
        Session::Anonymous
      }
    }
  }
}
