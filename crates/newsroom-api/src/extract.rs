//! Request extractors whose rejections render as [`ApiError`].
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies and,
//! for JSON, a 422 status. These wrappers turn every malformed input into a
//! `400 {"message": ...}`.

use axum::{
  extract::{FromRequest, FromRequestParts, Request},
  http::request::Parts,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use newsroom_core::store::DateRange;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// A JSON request body.
pub struct Body<T>(pub T);

impl<T, S> FromRequest<S> for Body<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let axum::Json(value) = axum::Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Body(value))
  }
}

/// Query-string parameters.
pub struct Params<T>(pub T);

impl<T, S> FromRequestParts<S> for Params<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let axum::extract::Query(value) =
      axum::extract::Query::<T>::from_request_parts(parts, state)
        .await
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Params(value))
  }
}

/// A single `{id}` path segment parsed as a UUID.
pub struct Id(pub Uuid);

impl<S> FromRequestParts<S> for Id
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let axum::extract::Path(raw) =
      axum::extract::Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Id(parse_id("id", &raw)?))
  }
}

/// Parse an id taken from a body field or path segment.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

/// Build a date filter from `startDate` / `endDate` query values.
///
/// The filter only applies when both bounds are given. Each bound is either
/// an RFC 3339 timestamp or a `YYYY-MM-DD` date; a bare end date covers the
/// whole day.
pub fn date_range(
  start: Option<&str>,
  end: Option<&str>,
) -> Result<Option<DateRange>, ApiError> {
  let (Some(start), Some(end)) = (start, end) else {
    return Ok(None);
  };
  let start = parse_bound(start, NaiveTime::MIN)?;
  let end = parse_bound(end, end_of_day())?;
  if start > end {
    return Err(ApiError::BadRequest("startDate is after endDate".into()));
  }
  Ok(Some(DateRange { start, end }))
}

fn end_of_day() -> NaiveTime {
  NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(raw: &str, time: NaiveTime) -> Result<DateTime<Utc>, ApiError> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map(|date| date.and_time(time).and_utc())
    .map_err(|_| ApiError::BadRequest(format!("Invalid date: {raw}")))
}
