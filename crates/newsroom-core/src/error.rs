//! Error types for `newsroom-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("news item {0} not found")]
  ArticleNotFound(Uuid),

  #[error("subject {0} not found")]
  SubjectNotFound(Uuid),

  #[error("comment {0} not found")]
  CommentNotFound(Uuid),

  #[error("news item {0} has already been published")]
  AlreadyPublished(Uuid),

  #[error("news item {0} is not published")]
  NotPublished(Uuid),

  #[error("news item {article_id} cannot move from {from} to {to}")]
  InvalidTransition {
    article_id: Uuid,
    from:       &'static str,
    to:         &'static str,
  },

  #[error("subject {0} is approved and can no longer be modified")]
  SubjectLocked(Uuid),

  #[error("comment {0} has already been approved")]
  CommentAlreadyApproved(Uuid),

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)` on store calls.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
