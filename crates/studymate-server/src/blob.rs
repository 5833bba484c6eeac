//! [`FsBlobStore`]: avatar storage on local disk.
//!
//! Files are content-addressed: the name is the SHA-256 of the bytes plus an
//! extension derived from the content type. They are served back by the
//! router under `/photos/`.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use studymate_core::blob::{BlobStore, image_extension};

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct FsBlobStore {
  dir:      PathBuf,
  base_url: String,
}

impl FsBlobStore {
  pub fn new(dir: impl Into<PathBuf>, base_url: &str) -> Self {
    Self { dir: dir.into(), base_url: base_url.trim_end_matches('/').to_owned() }
  }
}


impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, Error> {
    let ext = image_extension(content_type)
      .ok_or_else(|| Error::UnsupportedContentType(content_type.to_owned()))?;
    let name = format!("{}.{ext}", hex::encode(Sha256::digest(&bytes)));

    tokio::fs::create_dir_all(&self.dir).await?;
    tokio::fs::write(self.dir.join(&name), &bytes).await?;
    tracing::debug!(file = %name, size = bytes.len(), "avatar stored");

    Ok(format!("{}/photos/{name}", self.base_url))
  }
}
