//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use studymate_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// An extractor could not make sense of the request.
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Rejected { status, .. } => *status,
      ApiError::Core(e) => match e {
        CoreError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Unauthorized => StatusCode::FORBIDDEN,
        CoreError::HasDependents { .. } => StatusCode::CONFLICT,
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::Remote(_) | CoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"studymate\""),
      );
    }
    res
  }
}
