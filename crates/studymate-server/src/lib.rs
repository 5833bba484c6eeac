//! HTTP server wiring for StudyMate.
//!
//! Mounts the JSON API under `/api`, serves uploaded avatars under
//! `/photos/`, and authenticates callers with HTTP Basic against the users
//! listed in the config file.

pub mod auth;
pub mod blob;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use studymate_api::{ApiState, api_router};
use studymate_core::document::DocumentStore;
use tower_http::{services::ServeDir, trace::TraceLayer};

use auth::{BasicAuth, UserConfig};
use blob::FsBlobStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STUDYMATE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Public origin used to build avatar URLs, e.g. `https://study.example.com`.
  pub base_url:   String,
  pub store_path: PathBuf,
  pub photo_dir:  PathBuf,
  #[serde(default)]
  pub users:      Vec<UserConfig>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: DocumentStore + 'static,
{
  let blobs = FsBlobStore::new(&config.photo_dir, &config.base_url);
  let auth = BasicAuth::new(config.users.clone());
  let state = ApiState::new(store, Arc::new(blobs), Arc::new(auth));

  Router::new()
    .nest("/api", api_router(state))
    .nest_service("/photos", ServeDir::new(&config.photo_dir))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
