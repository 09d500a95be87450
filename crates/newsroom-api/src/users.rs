//! Handlers for `/users` endpoints. None of them require a token.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/signup` | 201; 409 on a taken username |
//! | `POST` | `/users/login` | Returns a token |
//! | `POST` | `/users/connect-as-visitor` | Idempotent; no token |

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use newsroom_core::{
  principal::{NewPrincipal, Role},
  store::NewsroomStore,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
  AppState,
  credentials::{hash_password, verify_password},
  error::ApiError,
  extract::Body,
};

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
  #[serde(default)]
  pub username:   String,
  #[serde(default)]
  pub password:   String,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub role:       Option<String>,
}

/// `POST /users/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  Body(body): Body<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  if body.username.trim().is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest("username and password are required".into()));
  }
  let role = body
    .role
    .as_deref()
    .and_then(|r| Role::from_str(r).ok())
    .filter(|r| r.is_writer())
    .ok_or_else(|| ApiError::BadRequest("Invalid role".into()))?;

  let existing = state
    .store
    .find_principal_by_username(&body.username)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::Conflict("Username already exists".into()));
  }

  let password_hash = hash_password(&body.password)?;
  let principal = state
    .store
    .add_principal(NewPrincipal {
      username: Some(body.username),
      password_hash: Some(password_hash),
      first_name: body.first_name,
      last_name: body.last_name,
      role,
    })
    .await
    .map_err(ApiError::store)?;

  info!(principal_id = %principal.principal_id, %role, "user signed up");
  Ok((StatusCode::CREATED, Json(json!({ "message": "User created" }))))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /users/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Body(body): Body<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let principal = state
    .store
    .find_principal_by_username(&body.username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::InvalidCredentials)?;

  let verified = principal
    .password_hash
    .as_deref()
    .is_some_and(|hash| verify_password(&body.password, hash));
  if !verified {
    return Err(ApiError::InvalidCredentials);
  }

  let token = state.tokens.issue(&principal)?;
  info!(principal_id = %principal.principal_id, "user logged in");
  Ok(Json(json!({
    "message": "Authentication successful",
    "token": token,
  })))
}

// ─── Visitor ──────────────────────────────────────────────────────────────────

/// `POST /users/connect-as-visitor`
pub async fn connect_as_visitor<S>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let existing = state
    .store
    .find_anonymous_principal()
    .await
    .map_err(ApiError::store)?;
  let visitor = match existing {
    Some(visitor) => visitor,
    None => {
      let visitor = state
        .store
        .add_principal(NewPrincipal::visitor())
        .await
        .map_err(ApiError::store)?;
      info!(principal_id = %visitor.principal_id, "anonymous visitor created");
      visitor
    }
  };
  Ok(Json(json!({
    "message": "Visitor connected successfully",
    "visitor": visitor,
  })))
}
