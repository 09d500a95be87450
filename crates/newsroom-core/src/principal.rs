//! Principals: the actors that act on the newsroom.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Determines which operations a principal may perform.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Reporter,
  Visitor,
}

impl Role {
  /// Roles that may author and edit content.
  pub fn is_writer(self) -> bool { matches!(self, Self::Admin | Self::Reporter) }
}

/// A registered or anonymous actor.
///
/// The anonymous visitor has no username and no password. Principals are never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
  #[serde(rename = "id")]
  pub principal_id:  Uuid,
  pub username:      Option<String>,
  /// Argon2 PHC string. Never serialised into responses.
  #[serde(skip_serializing, default)]
  pub password_hash: Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub role:          Role,
}

impl Principal {
  pub fn is_anonymous(&self) -> bool { self.username.is_none() }
}

/// Input to [`crate::store::NewsroomStore::add_principal`].
#[derive(Debug, Clone)]
pub struct NewPrincipal {
  pub username:      Option<String>,
  pub password_hash: Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub role:          Role,
}

impl NewPrincipal {
  /// The anonymous visitor principal.
  pub fn visitor() -> Self {
    Self {
      username:      None,
      password_hash: None,
      first_name:    None,
      last_name:     None,
      role:          Role::Visitor,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn role_string_forms_match_serde() {
    assert_eq!(Role::Reporter.to_string(), "reporter");
    assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    assert!(Role::from_str("editor").is_err());
    assert_eq!(serde_json::to_string(&Role::Visitor).unwrap(), "\"visitor\"");
  }

  #[test]
  fn password_hash_is_not_serialised() {
    let p = Principal {
      principal_id:  Uuid::new_v4(),
      username:      Some("GoGuy123".into()),
      password_hash: Some("$argon2id$secret".into()),
      first_name:    Some("John".into()),
      last_name:     Some("Doe".into()),
      role:          Role::Admin,
    };
    let json = serde_json::to_value(&p).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert_eq!(json["firstName"], "John");
  }
}
