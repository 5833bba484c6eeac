//! Errors raised by the server's own collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("unsupported content type: {0}")]
  UnsupportedContentType(String),
}
