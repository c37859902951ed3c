//! API error type and [`axum::response::IntoResponse`] implementation.

use std::fmt::Display;

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. The `Display` text is the message
/// placed in the `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  /// Upstream or storage failure. The source has already been logged; only
  /// the short message reaches the client.
  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  /// Log `source` and produce a 500 carrying `message`.
  pub fn internal(message: &str, source: impl Display) -> Self {
    tracing::error!(error = %source, "{message}");
    ApiError::Internal(message.to_owned())
  }
}

impl From<relsync_core::Error> for ApiError {
  fn from(e: relsync_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(e: PathRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized | ApiError::InvalidCredentials => {
        StatusCode::UNAUTHORIZED
      }
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
