//! Access guards: axum extractors that gate handlers by role.
//!
//! | Guard | Lets through | On success |
//! |-------|--------------|------------|
//! | [`AdminOnly`] | bearer token with role `admin` | raw token + claims |
//! | [`AdminOrReporter`] | bearer token with role `admin` or `reporter` | claims + a re-issued token |
//! | [`VisitorOrAnonymous`] | no identity, or a `visitor` identity | the (possibly implicit) identity |
//!
//! Token guards run before any body extractor, so authorization failures
//! short-circuit ahead of entity lookups.

use std::{convert::Infallible, sync::Arc};

use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, HeaderValue, header, request::Parts},
  middleware::Next,
  response::{IntoResponseParts, Response, ResponseParts},
};
use newsroom_core::{principal::Role, store::NewsroomStore};
use tracing::warn;
use uuid::Uuid;

use crate::{
  AppState,
  credentials::{Claims, TokenIssuer},
  error::ApiError,
};

/// Response header carrying the token re-issued by [`AdminOrReporter`].
pub const REFRESHED_TOKEN_HEADER: &str = "x-refreshed-token";

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(ApiError::AuthenticationFailed)
}

fn decode(parts: &Parts, tokens: &TokenIssuer) -> Result<(String, Claims), ApiError> {
  let token = bearer(&parts.headers).inspect_err(|e| {
    warn!(path = %parts.uri.path(), error = %e, "missing bearer token");
  })?;
  let claims = tokens.decode(token).inspect_err(|e| {
    warn!(path = %parts.uri.path(), error = %e, "token rejected");
  })?;
  Ok((token.to_owned(), claims))
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The caller's identity, placed in request extensions by [`identify`] when
/// the request carries a valid token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
  pub principal_id: Option<Uuid>,
  pub role:         Role,
}

impl Identity {
  /// The context assumed for a request that carries no identity.
  pub fn implicit_visitor() -> Self {
    Self { principal_id: None, role: Role::Visitor }
  }
}

/// Middleware: attach an [`Identity`] when a valid bearer token is present.
/// Requests without one pass through untouched.
pub async fn identify(
  State(tokens): State<Arc<TokenIssuer>>,
  mut req: Request,
  next: Next,
) -> Response {
  let claims = bearer(req.headers())
    .ok()
    .and_then(|token| tokens.decode(token).ok());
  if let Some(claims) = claims {
    req
      .extensions_mut()
      .insert(Identity { principal_id: Some(claims.sub), role: claims.role });
  }
  next.run(req).await
}

// ─── AdminOnly ───────────────────────────────────────────────────────────────

pub struct AdminOnly {
  pub claims: Claims,
  /// The raw bearer token the request was authorized with.
  pub token:  String,
}

impl<S> FromRequestParts<AppState<S>> for AdminOnly
where
  S: NewsroomStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (token, claims) = decode(parts, &state.tokens)?;
    if claims.role != Role::Admin {
      warn!(path = %parts.uri.path(), role = %claims.role, "admin role required");
      return Err(ApiError::Unauthorized(
        "Authorization failed: Only admin role allowed",
      ));
    }
    Ok(AdminOnly { claims, token })
  }
}

// ─── AdminOrReporter ─────────────────────────────────────────────────────────

/// A re-issued token, written to the [`REFRESHED_TOKEN_HEADER`] response
/// header when returned from a handler.
#[derive(Debug, Clone)]
pub struct RefreshedToken(pub String);

impl IntoResponseParts for RefreshedToken {
  type Error = Infallible;

  fn into_response_parts(
    self,
    mut res: ResponseParts,
  ) -> Result<ResponseParts, Self::Error> {
    if let Ok(value) = HeaderValue::from_str(&self.0) {
      res.headers_mut().insert(REFRESHED_TOKEN_HEADER, value);
    }
    Ok(res)
  }
}

pub struct AdminOrReporter {
  pub claims:    Claims,
  pub refreshed: RefreshedToken,
}

impl<S> FromRequestParts<AppState<S>> for AdminOrReporter
where
  S: NewsroomStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (_, claims) = decode(parts, &state.tokens)?;
    if !claims.role.is_writer() {
      warn!(path = %parts.uri.path(), role = %claims.role, "admin or reporter role required");
      return Err(ApiError::Unauthorized("Authorization failed"));
    }
    let refreshed = RefreshedToken(state.tokens.reissue(&claims)?);
    Ok(AdminOrReporter { claims, refreshed })
  }
}

// ─── VisitorOrAnonymous ──────────────────────────────────────────────────────

pub struct VisitorOrAnonymous {
  pub identity: Identity,
}

impl<S> FromRequestParts<S> for VisitorOrAnonymous
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    match parts.extensions.get::<Identity>() {
      None => Ok(VisitorOrAnonymous { identity: Identity::implicit_visitor() }),
      Some(identity) if identity.role == Role::Visitor => {
        Ok(VisitorOrAnonymous { identity: identity.clone() })
      }
      Some(identity) => {
        warn!(path = %parts.uri.path(), role = %identity.role, "visitor route refused");
        Err(ApiError::Forbidden("Unauthorized access".into()))
      }
    }
  }
}
