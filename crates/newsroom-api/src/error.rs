//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler or extractor.
///
/// Every variant renders as `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Token expired")]
  TokenExpired,

  #[error("Invalid token")]
  InvalidToken,

  #[error("Authentication failed")]
  AuthenticationFailed,

  /// A valid token whose role is not allowed through the gate.
  #[error("{0}")]
  Unauthorized(&'static str),

  #[error("Invalid credentials")]
  InvalidCredentials,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error. Used as `.map_err(ApiError::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::TokenExpired
      | ApiError::InvalidToken
      | ApiError::AuthenticationFailed
      | ApiError::Unauthorized(_)
      | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<newsroom_core::Error> for ApiError {
  fn from(err: newsroom_core::Error) -> Self {
    use newsroom_core::Error as E;
    match err {
      E::ArticleNotFound(_) | E::SubjectNotFound(_) | E::CommentNotFound(_) => {
        ApiError::NotFound(err.to_string())
      }
      E::NotPublished(_) => ApiError::Forbidden(err.to_string()),
      E::AlreadyPublished(_)
      | E::InvalidTransition { .. }
      | E::SubjectLocked(_)
      | E::CommentAlreadyApproved(_)
      | E::MissingField(_) => ApiError::BadRequest(err.to_string()),
      E::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Internal(_) | ApiError::Store(_) => {
        error!(error = %self, "request failed");
        "Internal server error".to_string()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
