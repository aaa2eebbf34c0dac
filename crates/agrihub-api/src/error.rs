//! API error type and [`axum::response::IntoResponse`] implementation.

use agrihub_core::error::{DomainError, Error as RegionError};
use axum::{
  Json,
  extract::rejection::PathRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("rejected: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Feed(#[from] agrihub_feed::Error),
}

impl ApiError {
  /// Classify a store error by the domain rejection it carries, if any.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + DomainError + Send + Sync + 'static,
  {
    match e.domain() {
      Some(RegionError::NotFound { .. }) => Self::NotFound(e.to_string()),
      Some(RegionError::DuplicateName(_)) => Self::Conflict(e.to_string()),
      Some(_) => Self::Unprocessable(e.to_string()),
      None => Self::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Feed(agrihub_feed::Error::Transport(_) | agrihub_feed::Error::Parse(_)) => {
        StatusCode::BAD_GATEWAY
      }
      ApiError::Feed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(%status, error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
