//! The current principal, passed explicitly to every access-layer call.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The authenticated user on whose behalf operations run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:           String,
  pub display_name: Option<String>,
  pub email:        Option<String>,
  pub photo_url:    Option<String>,
}

impl Principal {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into(), display_name: None, email: None, photo_url: None }
  }
}

/// Who is making a call. `Anonymous` is a valid session; operations that need
/// an identity reject it with [`Error::NotAuthenticated`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
  #[default]
  Anonymous,
  Authenticated(Principal),
}

impl Session {
  pub fn principal(&self) -> Option<&Principal> {
    match self {
      Self::Anonymous => None,
      Self::Authenticated(p) => Some(p),
    }
  }

  /// The principal, or [`Error::NotAuthenticated`].
  pub fn require(&self) -> Result<&Principal> {
    self.principal().ok_or(Error::NotAuthenticated)
  }
}

impl From<Principal> for Session {
  fn from(p: Principal) -> Self { Self::Authenticated(p) }
}

impl From<Option<Principal>> for Session {
  fn from(p: Option<Principal>) -> Self {
    p.map_or(Self::Anonymous, Self::Authenticated)
  }
}
