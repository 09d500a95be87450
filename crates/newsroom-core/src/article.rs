//! Articles and the publication state machine.
//!
//! ```text
//! created ──submit──▶ submitted ──accept──▶ approved ──publish──▶ published
//!    │                    │                    │
//!    └────────reject──────┴────────reject──────┘
//!                         ▼
//!                     rejected ──modify──▶ submitted
//! ```
//!
//! `published` is terminal. Every transition method checks the current state
//! before touching any field, so a failed transition leaves the article
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, subject::SubjectSnapshot};

// ─── Status ──────────────────────────────────────────────────────────────────

/// The bare lifecycle status, used for queries and storage.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArticleStatus {
  Created,
  Submitted,
  Approved,
  Published,
  Rejected,
}

impl ArticleStatus {
  /// Listing order used by the editorial dashboard. Rejected articles are not
  /// listed.
  pub const LISTED: [ArticleStatus; 4] =
    [Self::Created, Self::Submitted, Self::Approved, Self::Published];

  pub fn as_str(self) -> &'static str { self.into() }
}

/// The lifecycle state of an article. The rejection reason lives inside the
/// `Rejected` variant, so it exists exactly when the article is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ArticleState {
  Created,
  Submitted,
  Approved,
  Published,
  Rejected {
    #[serde(rename = "rejectionReason")]
    rejection_reason: String,
  },
}

impl ArticleState {
  pub fn status(&self) -> ArticleStatus {
    match self {
      Self::Created => ArticleStatus::Created,
      Self::Submitted => ArticleStatus::Submitted,
      Self::Approved => ArticleStatus::Approved,
      Self::Published => ArticleStatus::Published,
      Self::Rejected { .. } => ArticleStatus::Rejected,
    }
  }

  /// Rebuild a state from its stored columns. Returns `None` when the reason
  /// is present without a rejection or missing from one.
  pub fn from_parts(
    status: ArticleStatus,
    rejection_reason: Option<String>,
  ) -> Option<Self> {
    match (status, rejection_reason) {
      (ArticleStatus::Rejected, Some(rejection_reason)) => {
        Some(Self::Rejected { rejection_reason })
      }
      (ArticleStatus::Rejected, None) | (_, Some(_)) => None,
      (ArticleStatus::Created, None) => Some(Self::Created),
      (ArticleStatus::Submitted, None) => Some(Self::Submitted),
      (ArticleStatus::Approved, None) => Some(Self::Approved),
      (ArticleStatus::Published, None) => Some(Self::Published),
    }
  }

  pub fn rejection_reason(&self) -> Option<&str> {
    match self {
      Self::Rejected { rejection_reason } => Some(rejection_reason),
      _ => None,
    }
  }
}

// ─── Article ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  #[serde(rename = "id")]
  pub article_id:        Uuid,
  pub title:             String,
  pub content:           String,
  pub created_at:        DateTime<Utc>,
  pub published_at:      Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub state:             ArticleState,
  /// Live references to subjects, in the order they were named.
  pub subjects:          Vec<Uuid>,
  /// Frozen copies of subjects approved against this article.
  pub approved_subjects: Vec<SubjectSnapshot>,
  /// Approved comments, in approval order.
  pub comments:          Vec<Uuid>,
}

/// Input to [`crate::store::NewsroomStore::add_article`].
#[derive(Debug, Clone)]
pub struct NewArticle {
  pub title:    String,
  pub content:  String,
  pub subjects: Vec<Uuid>,
}

/// Resolved field overwrites; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
  pub title:    Option<String>,
  pub content:  Option<String>,
  pub subjects: Option<Vec<Uuid>>,
}

impl Article {
  pub fn status(&self) -> ArticleStatus { self.state.status() }

  pub fn is_published(&self) -> bool { self.state == ArticleState::Published }

  fn ensure_not_published(&self) -> Result<()> {
    if self.is_published() {
      return Err(Error::AlreadyPublished(self.article_id));
    }
    Ok(())
  }

  /// Comments and subject approvals only attach to published articles.
  pub fn ensure_published(&self) -> Result<()> {
    if !self.is_published() {
      return Err(Error::NotPublished(self.article_id));
    }
    Ok(())
  }

  fn invalid(&self, to: ArticleStatus) -> Error {
    Error::InvalidTransition {
      article_id: self.article_id,
      from:       self.status().as_str(),
      to:         to.as_str(),
    }
  }

  fn overwrite(&mut self, changes: ArticleChanges) {
    if let Some(title) = changes.title {
      self.title = title;
    }
    if let Some(content) = changes.content {
      self.content = content;
    }
    if let Some(subjects) = changes.subjects {
      self.subjects = subjects;
    }
  }

  /// Editorial edit of any unpublished article. Status is unchanged.
  pub fn edit(&mut self, changes: ArticleChanges) -> Result<()> {
    self.ensure_not_published()?;
    self.overwrite(changes);
    Ok(())
  }

  /// `created → submitted`.
  pub fn submit(&mut self) -> Result<()> {
    self.ensure_not_published()?;
    match self.state {
      ArticleState::Created => {
        self.state = ArticleState::Submitted;
        Ok(())
      }
      _ => Err(self.invalid(ArticleStatus::Submitted)),
    }
  }

  /// `submitted → approved`.
  pub fn accept(&mut self) -> Result<()> {
    self.ensure_not_published()?;
    match self.state {
      ArticleState::Submitted => {
        self.state = ArticleState::Approved;
        Ok(())
      }
      _ => Err(self.invalid(ArticleStatus::Approved)),
    }
  }

  /// `created | submitted | approved → rejected`.
  pub fn reject(&mut self, reason: String) -> Result<()> {
    self.ensure_not_published()?;
    match self.state {
      ArticleState::Created | ArticleState::Submitted | ArticleState::Approved => {
        self.state = ArticleState::Rejected { rejection_reason: reason };
        Ok(())
      }
      _ => Err(self.invalid(ArticleStatus::Rejected)),
    }
  }

  /// `rejected → submitted`, applying `changes` on the way.
  pub fn modify(&mut self, changes: ArticleChanges) -> Result<()> {
    if !matches!(self.state, ArticleState::Rejected { .. }) {
      return Err(self.invalid(ArticleStatus::Submitted));
    }
    self.overwrite(changes);
    self.state = ArticleState::Submitted;
    Ok(())
  }

  /// `approved → published`, stamping `published_at`.
  pub fn publish(&mut self, at: DateTime<Utc>) -> Result<()> {
    self.ensure_not_published()?;
    match self.state {
      ArticleState::Approved => {
        self.state = ArticleState::Published;
        self.published_at = Some(at);
        Ok(())
      }
      _ => Err(self.invalid(ArticleStatus::Published)),
    }
  }
}
