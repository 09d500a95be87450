//! The `NewsroomStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `newsroom-store-sqlite`).
//! The [`crate::workflow`] operations and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! Every call is atomic for the single entity it touches. An article's
//! comment list and approved-subject snapshots change only through the
//! targeted `link_comment`, `unlink_comment` and `attach_snapshot` calls, so
//! concurrent moderation of one article never overwrites another's work.
//! Sequences spanning several entities are not transactional.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  article::{Article, ArticleStatus, NewArticle},
  comment::{Comment, CommentState, NewComment},
  principal::{NewPrincipal, Principal},
  subject::{NewSubject, Subject, SubjectSnapshot, SubjectStatus},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// An inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl DateRange {
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.start <= at && at <= self.end
  }
}

/// Parameters for [`NewsroomStore::list_subjects`].
#[derive(Debug, Clone, Default)]
pub struct SubjectQuery {
  pub status:        Option<SubjectStatus>,
  /// Case-insensitive substring match on the name.
  pub name_contains: Option<String>,
}

/// Parameters for [`NewsroomStore::list_articles`].
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
  /// Restrict to these statuses; empty means any.
  pub statuses:                    Vec<ArticleStatus>,
  /// Case-insensitive substring match on the title.
  pub title_contains:              Option<String>,
  /// Case-insensitive substring match on the content.
  pub content_contains:            Option<String>,
  /// Only articles whose live subject list references this subject.
  pub subject_id:                  Option<Uuid>,
  /// Keep articles created *or* published inside the range.
  pub created_or_published_within: Option<DateRange>,
  /// Keep articles published inside the range.
  pub published_within:            Option<DateRange>,
}

/// Parameters for [`NewsroomStore::list_comments`].
#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
  pub state: Option<CommentState>,
  /// Restrict to these ids; `None` means any.
  pub ids:   Option<Vec<Uuid>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a newsroom persistence backend.
///
/// Listing methods return rows in creation order (oldest first); callers
/// impose any presentation order themselves.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait NewsroomStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Principals ────────────────────────────────────────────────────────

  fn add_principal(
    &self,
    input: NewPrincipal,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  fn find_principal_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;

  /// The principal with no username, if one has been created.
  fn find_anonymous_principal(
    &self,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Persist a new subject with `status = created`.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Exact, case-sensitive name lookup. If several subjects share the name,
  /// the oldest wins.
  fn find_subject_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// Overwrite a stored subject with `subject`.
  fn save_subject<'a>(
    &'a self,
    subject: &'a Subject,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a subject and strip it from every article's live subject list.
  /// Returns `false` if it did not exist.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_subjects<'a>(
    &'a self,
    query: &'a SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  // ── Articles ──────────────────────────────────────────────────────────

  /// Persist a new article with `status = created` and no comments.
  fn add_article(
    &self,
    input: NewArticle,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  fn get_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Overwrite a stored article's fields, status and live subject list.
  /// `comments` and `approved_subjects` are left as stored.
  fn save_article<'a>(
    &'a self,
    article: &'a Article,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Append `snapshot` to an article's approved subjects unless one for the
  /// same subject is already there. Returns whether it was appended.
  fn attach_snapshot<'a>(
    &'a self,
    article_id: Uuid,
    snapshot: &'a SubjectSnapshot,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Append a comment to the end of an article's comment list. Linking an
  /// already linked comment is a no-op.
  fn link_comment(
    &self,
    article_id: Uuid,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a comment from an article's comment list, keeping the order of
  /// the rest. Returns `false` if it was not linked.
  fn unlink_comment(
    &self,
    article_id: Uuid,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_articles<'a>(
    &'a self,
    query: &'a ArticleQuery,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + 'a;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Persist a new, unlinked comment with `state = created`.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn save_comment<'a>(
    &'a self,
    comment: &'a Comment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if the comment did not exist.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_comments<'a>(
    &'a self,
    query: &'a CommentQuery,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;
}
