//! Reader comments and their moderation state.
//!
//! A comment starts `created` and is either approved (and linked into a
//! published article) or rejected, which deletes it outright. No rejected
//! comment is ever stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommentState {
  #[default]
  Created,
  Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  #[serde(rename = "id")]
  pub comment_id:   Uuid,
  pub content:      String,
  pub creator_name: Option<String>,
  #[serde(rename = "creationDate")]
  pub created_at:   DateTime<Utc>,
  pub state:        CommentState,
  /// The article this comment was approved into; `None` until approval.
  pub article_id:   Option<Uuid>,
}

/// The public projection of an approved comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComment {
  pub id:           Uuid,
  pub content:      String,
  pub creator_name: Option<String>,
}

impl From<Comment> for PublicComment {
  fn from(c: Comment) -> Self {
    Self { id: c.comment_id, content: c.content, creator_name: c.creator_name }
  }
}

/// Input to [`crate::store::NewsroomStore::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub content:      String,
  pub creator_name: Option<String>,
}

/// Content must contain something other than whitespace.
pub fn validate_content(content: &str) -> Result<()> {
  if content.trim().is_empty() {
    return Err(Error::MissingField("content"));
  }
  Ok(())
}

impl Comment {
  pub fn is_approved(&self) -> bool { self.state == CommentState::Approved }

  /// Replace the content of a comment still awaiting moderation.
  pub fn edit(&mut self, content: String) -> Result<()> {
    validate_content(&content)?;
    if self.is_approved() {
      return Err(Error::CommentAlreadyApproved(self.comment_id));
    }
    self.content = content;
    Ok(())
  }

  /// `created → approved`, remembering the owning article.
  pub fn approve(&mut self, article_id: Uuid) -> Result<()> {
    if self.is_approved() {
      return Err(Error::CommentAlreadyApproved(self.comment_id));
    }
    self.state = CommentState::Approved;
    self.article_id = Some(article_id);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn comment() -> Comment {
    Comment {
      comment_id:   Uuid::new_v4(),
      content:      "First!".into(),
      creator_name: Some("reader".into()),
      created_at:   Utc::now(),
      state:        CommentState::Created,
      article_id:   None,
    }
  }

  #[test]
  fn blank_edit_is_rejected() {
    let mut c = comment();
    assert!(matches!(c.edit("   ".into()), Err(Error::MissingField("content"))));
    assert_eq!(c.content, "First!");
  }

  #[test]
  fn approve_links_article_once() {
    let mut c = comment();
    let article = Uuid::new_v4();
    c.approve(article).unwrap();
    assert_eq!(c.article_id, Some(article));
    assert!(matches!(
      c.approve(Uuid::new_v4()),
      Err(Error::CommentAlreadyApproved(_))
    ));
    assert_eq!(c.article_id, Some(article));
  }

  #[test]
  fn approved_comment_cannot_be_edited() {
    let mut c = comment();
    c.approve(Uuid::new_v4()).unwrap();
    assert!(c.edit("changed".into()).is_err());
    assert_eq!(c.content, "First!");
  }

  #[test]
  fn public_projection_drops_moderation_fields() {
    let json = serde_json::to_value(PublicComment::from(comment())).unwrap();
    let keys: Vec<&str> =
      json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    assert_eq!(json["creatorName"], "reader");
  }
}
