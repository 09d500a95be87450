//! Subjects: moderated topical tags attached to articles.
//!
//! A subject is mutable while `created`. It becomes `approved` the first time
//! it is approved against a published article and is immutable from then on.

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
pub enum SubjectStatus {
  #[default]
  Created,
  Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  #[serde(rename = "id")]
  pub subject_id:  Uuid,
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    Vec<String>,
  pub status:      SubjectStatus,
  pub created_at:  DateTime<Utc>,
  pub approved_at: Option<DateTime<Utc>>,
}

/// A frozen copy of a subject taken when it was approved against an article.
/// Later changes to the subject (or its deletion) do not affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSnapshot {
  #[serde(rename = "id")]
  pub subject_id:  Uuid,
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    Vec<String>,
  pub status:      SubjectStatus,
  pub created_at:  DateTime<Utc>,
  pub approved_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::NewsroomStore::add_subject`].
#[derive(Debug, Clone, Default)]
pub struct NewSubject {
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    Vec<String>,
}

impl NewSubject {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }
}

/// Field overwrites for a subject. `name` is mandatory on every update.
#[derive(Debug, Clone)]
pub struct SubjectPatch {
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    Option<Vec<String>>,
}

impl Subject {
  pub fn is_approved(&self) -> bool { self.status == SubjectStatus::Approved }

  /// Apply `patch` in place. Fails once the subject is approved.
  pub fn apply(&mut self, patch: SubjectPatch) -> Result<()> {
    if self.is_approved() {
      return Err(Error::SubjectLocked(self.subject_id));
    }
    self.name = patch.name;
    if let Some(maiden_name) = patch.maiden_name {
      self.maiden_name = Some(maiden_name);
    }
    if let Some(children) = patch.children {
      self.children = children;
    }
    Ok(())
  }

  /// Move to `approved`. Returns `false` if the subject was already approved,
  /// in which case nothing changes.
  pub fn approve(&mut self, at: DateTime<Utc>) -> bool {
    if self.is_approved() {
      return false;
    }
    self.status = SubjectStatus::Approved;
    self.approved_at = Some(at);
    true
  }

  pub fn snapshot(&self) -> SubjectSnapshot {
    SubjectSnapshot {
      subject_id:  self.subject_id,
      name:        self.name.clone(),
      maiden_name: self.maiden_name.clone(),
      children:    self.children.clone(),
      status:      self.status,
      created_at:  self.created_at,
      approved_at: self.approved_at,
    }
  }
}
