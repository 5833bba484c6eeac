//! The blob-store contract used for avatar uploads.

use std::future::Future;

/// Accepts an image payload and returns a publicly addressable URL.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn upload<'a>(
    &'a self,
    bytes: Vec<u8>,
    content_type: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// File extension for an accepted avatar content type, or `None` if the type
/// is not one we store. Parameters such as `; charset=...` are ignored.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
  let mime = content_type.split(';').next().unwrap_or_default().trim();
  match mime.to_ascii_lowercase().as_str() {
    "image/jpeg" | "image/jpg" => Some("jpg"),
    "image/png" => Some("png"),
    "image/gif" => Some("gif"),
    "image/webp" => Some("webp"),
    _ => None,
  }
}
