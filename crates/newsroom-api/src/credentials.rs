//! Token issuing and password hashing.
//!
//! Tokens are HS256 JWTs carrying the principal id, username and role. Their
//! lifetime is capped at one hour regardless of configuration.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use newsroom_core::principal::{Principal, Role};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Upper bound on a token's validity window, in seconds.
pub const MAX_TOKEN_TTL_SECS: u64 = 3600;

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
  /// Principal id.
  pub sub:      Uuid,
  pub username: Option<String>,
  pub role:     Role,
  pub iat:      i64,
  pub exp:      i64,
}

/// Signs and verifies tokens with a process-wide secret.
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl TokenIssuer {
  /// `ttl_secs` is clamped to [`MAX_TOKEN_TTL_SECS`].
  pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
    let secs = ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64;
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl:      Duration::seconds(secs),
    }
  }

  /// A fresh token for a principal that just logged in.
  pub fn issue(&self, principal: &Principal) -> Result<String, ApiError> {
    self.sign(principal.principal_id, principal.username.clone(), principal.role)
  }

  /// A derived token with the same identity and a new validity window.
  pub fn reissue(&self, claims: &Claims) -> Result<String, ApiError> {
    self.sign(claims.sub, claims.username.clone(), claims.role)
  }

  pub fn decode(&self, token: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::TokenExpired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => ApiError::InvalidToken,
        _ => ApiError::AuthenticationFailed,
      })
  }

  fn sign(
    &self,
    sub: Uuid,
    username: Option<String>,
    role: Role,
  ) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      sub,
      username,
      role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
  }
}

// ─── Passwords ───────────────────────────────────────────────────────────────

fn argon2_instance() -> Argon2<'static> {
  #[cfg(test)]
  {
    use argon2::{Algorithm, Params, Version};
    // Cheap parameters so tests do not spend seconds hashing.
    let params = Params::new(1024, 1, 1, None).expect("valid argon2 test params");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
  }

  #[cfg(not(test))]
  {
    Argon2::default()
  }
}

/// Hash `password` into an argon2 PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  argon2_instance()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `false` for a wrong password or an unparseable hash.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  argon2_instance()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}
