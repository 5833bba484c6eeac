//! The caller's own profile. Profiles are keyed by principal id, so there is
//! no listing and no cross-principal access.

use chrono::Utc;

use crate::{
  Error, Result,
  access::load_owned,
  blob::{BlobStore, image_extension},
  document::{Collection, Document, DocumentStore},
  profile::{self, Profile, ProfilePatch},
  session::Session,
};

const COLLECTION: Collection = Collection::Profiles;

/// Create the caller's profile on first sign-in; return the existing one
/// otherwise. `name` falls back to the principal's display name.
pub async fn ensure_exists<S: DocumentStore>(
  store: &S,
  session: &Session,
  name: Option<String>,
) -> Result<Profile> {
  let principal = session.require()?;

  if let Some(existing) = store
    .get(COLLECTION, &principal.id)
    .await
    .map_err(Error::remote)?
  {
    return existing.decode();
  }

  let fields = profile::initial_fields(principal, name, Utc::now());
  let inserted = store
    .insert(COLLECTION, &principal.id, fields.clone())
    .await
    .map_err(Error::remote)?;
  if !inserted {
    // Another request created it first; theirs may already carry edits.
    return get_mine(store, session).await;
  }
  tracing::info!(principal = %principal.id, "profile created");

  Document { id: principal.id.clone(), fields }.decode()
}

/// The caller's profile, or [`Error::NotFound`] before it has been created.
pub async fn get_mine<S: DocumentStore>(store: &S, session: &Session) -> Result<Profile> {
  let principal = session.require()?;
  load_owned(store, principal, COLLECTION, &principal.id).await?.decode()
}

pub async fn update_mine<S: DocumentStore>(
  store: &S,
  session: &Session,
  patch: ProfilePatch,
) -> Result<Profile> {
  let principal = session.require()?;
  patch.validate()?;
  load_owned(store, principal, COLLECTION, &principal.id).await?;

  store
    .update(COLLECTION, &principal.id, patch.into_fields(Utc::now()))
    .await
    .map_err(Error::remote)?;
  get_mine(store, session).await
}

/// Upload a new avatar through `blobs` and point the caller's profile at it.
/// Returns the public URL.
pub async fn upload_avatar<S, B>(
  store: &S,
  blobs: &B,
  session: &Session,
  bytes: Vec<u8>,
  content_type: &str,
) -> Result<String>
where
  S: DocumentStore,
  B: BlobStore,
{
  let principal = session.require()?;
  if image_extension(content_type).is_none() {
    return Err(Error::InvalidInput(format!(
      "avatar must be a JPEG, PNG, GIF or WebP image, got {content_type:?}"
    )));
  }
  if bytes.is_empty() {
    return Err(Error::InvalidInput("avatar must not be empty".into()));
  }
  load_owned(store, principal, COLLECTION, &principal.id).await?;

  let url = blobs
    .upload(bytes, content_type)
    .await
    .map_err(Error::remote)?;

  let patch = ProfilePatch { name: None, photo_url: Some(Some(url.clone())) };
  store
    .update(COLLECTION, &principal.id, patch.into_fields(Utc::now()))
    .await
    .map_err(Error::remote)?;
  tracing::info!(principal = %principal.id, %url, "avatar updated");
  Ok(url)
}
