//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (nanosecond
//! precision, `Z` suffix) so that lexicographic comparison in SQL matches
//! chronological order. Lists and snapshots are stored as compact JSON. UUIDs
//! are stored as hyphenated lowercase strings. Enum columns use the lowercase
//! names produced by their `Display` impls.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use newsroom_core::{
  article::{Article, ArticleState, ArticleStatus},
  comment::Comment,
  principal::Principal,
  subject::{Subject, SubjectSnapshot},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

/// Parse an enum column through its `FromStr` impl.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

/// Unicode case folding used on both sides of text searches.
pub fn fold_case(text: &str) -> String { text.to_lowercase() }

/// Escape `%`, `_` and `\` so user text matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern, and wrap it for substring matching.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `principals` row.
pub struct RawPrincipal {
  pub principal_id:  String,
  pub username:      Option<String>,
  pub password_hash: Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub role:          String,
}

impl RawPrincipal {
  pub const COLUMNS: &'static str =
    "principal_id, username, password_hash, first_name, last_name, role";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      principal_id:  row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      first_name:    row.get(3)?,
      last_name:     row.get(4)?,
      role:          row.get(5)?,
    })
  }

  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      principal_id:  decode_uuid(&self.principal_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      first_name:    self.first_name,
      last_name:     self.last_name,
      role:          decode_enum("role", &self.role)?,
    })
  }
}

/// Raw strings read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id:  String,
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    String,
  pub status:      String,
  pub created_at:  String,
  pub approved_at: Option<String>,
}

impl RawSubject {
  pub const COLUMNS: &'static str =
    "subject_id, name, maiden_name, children, status, created_at, approved_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:  row.get(0)?,
      name:        row.get(1)?,
      maiden_name: row.get(2)?,
      children:    row.get(3)?,
      status:      row.get(4)?,
      created_at:  row.get(5)?,
      approved_at: row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:  decode_uuid(&self.subject_id)?,
      name:        self.name,
      maiden_name: self.maiden_name,
      children:    serde_json::from_str(&self.children)?,
      status:      decode_enum("subject status", &self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      approved_at: decode_opt_dt(self.approved_at)?,
    })
  }
}

/// Raw strings read from an `articles` row plus its ordered join rows.
pub struct RawArticle {
  pub article_id:        String,
  pub title:             String,
  pub content:           String,
  pub created_at:        String,
  pub published_at:      Option<String>,
  pub status:            String,
  pub rejection_reason:  Option<String>,
  pub approved_subjects: String,
  pub subjects:          Vec<String>,
  pub comments:          Vec<String>,
}

impl RawArticle {
  pub const COLUMNS: &'static str = "article_id, title, content, created_at, \
     published_at, status, rejection_reason, approved_subjects";

  /// Read the `articles` columns; the join lists are filled in afterwards.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id:        row.get(0)?,
      title:             row.get(1)?,
      content:           row.get(2)?,
      created_at:        row.get(3)?,
      published_at:      row.get(4)?,
      status:            row.get(5)?,
      rejection_reason:  row.get(6)?,
      approved_subjects: row.get(7)?,
      subjects:          Vec::new(),
      comments:          Vec::new(),
    })
  }

  pub fn into_article(self) -> Result<Article> {
    let status: ArticleStatus = decode_enum("article status", &self.status)?;
    let state = ArticleState::from_parts(status, self.rejection_reason)
      .ok_or_else(|| Error::Corrupt {
        id:     self.article_id.clone(),
        reason: "rejection reason does not match status",
      })?;
    let approved_subjects: Vec<SubjectSnapshot> =
      serde_json::from_str(&self.approved_subjects)?;

    Ok(Article {
      article_id: decode_uuid(&self.article_id)?,
      title: self.title,
      content: self.content,
      created_at: decode_dt(&self.created_at)?,
      published_at: decode_opt_dt(self.published_at)?,
      state,
      subjects: self
        .subjects
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      approved_subjects,
      comments: self
        .comments
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id:   String,
  pub content:      String,
  pub creator_name: Option<String>,
  pub created_at:   String,
  pub state:        String,
  pub article_id:   Option<String>,
}

impl RawComment {
  pub const COLUMNS: &'static str =
    "comment_id, content, creator_name, created_at, state, article_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:   row.get(0)?,
      content:      row.get(1)?,
      creator_name: row.get(2)?,
      created_at:   row.get(3)?,
      state:        row.get(4)?,
      article_id:   row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id:   decode_uuid(&self.comment_id)?,
      content:      self.content,
      creator_name: self.creator_name,
      created_at:   decode_dt(&self.created_at)?,
      state:        decode_enum("comment state", &self.state)?,
      article_id:   self.article_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("sci"), "%sci%");
    assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
  }

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let b = a + chrono::Duration::milliseconds(1500);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }
}
