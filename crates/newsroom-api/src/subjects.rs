//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `POST`   | `/subjects` | admin or reporter |
//! | `GET`    | `/subjects` | admin or reporter |
//! | `GET`    | `/subjects/{id}` | admin or reporter |
//! | `PATCH`  | `/subjects/{id}` | admin or reporter |
//! | `DELETE` | `/subjects/{id}` | admin |
//! | `GET`    | `/subjects/{id}/news` | admin or reporter |
//! | `POST`   | `/subjects/approve` | admin |
//! | `GET`    | `/subjects/approve/approved` | visitor or anonymous |
//! | `GET`    | `/subjects/search?name=` | admin or reporter |
//! | `GET`    | `/subjects/approved-search?name=` | visitor or anonymous |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use newsroom_core::{
  article::Article,
  store::NewsroomStore,
  subject::{NewSubject, Subject, SubjectPatch, SubjectStatus},
  workflow::subjects,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  error::ApiError,
  extract::{Body, Id, Params, parse_id},
  guard::{AdminOnly, AdminOrReporter, VisitorOrAnonymous},
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBody {
  #[serde(default)]
  pub name:        String,
  pub maiden_name: Option<String>,
  pub children:    Option<Vec<String>>,
}

/// `POST /subjects`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Body(body): Body<SubjectBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let input = NewSubject {
    name:        body.name,
    maiden_name: body.maiden_name,
    children:    body.children.unwrap_or_default(),
  };
  let subject = subjects::create(state.store.as_ref(), input).await?;
  Ok((
    StatusCode::CREATED,
    guard.refreshed,
    Json(json!({ "message": "Subject created successfully", "subject": subject })),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /subjects/{id}`: `name` is mandatory.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
  Body(body): Body<SubjectBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let patch = SubjectPatch {
    name:        body.name,
    maiden_name: body.maiden_name,
    children:    body.children,
  };
  let subject = subjects::update(state.store.as_ref(), id, patch).await?;
  Ok((
    guard.refreshed,
    Json(json!({ "message": "Subject updated successfully", "subject": subject })),
  ))
}

// ─── Approve ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
  pub subject_id:   String,
  pub news_item_id: String,
}

/// `POST /subjects/approve`: body: `{"subjectId": ..., "newsItemId": ...}`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Body(body): Body<ApproveBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let subject_id = parse_id("subjectId", &body.subject_id)?;
  let article_id = parse_id("newsItemId", &body.news_item_id)?;
  let subject = subjects::approve(state.store.as_ref(), subject_id, article_id).await?;
  Ok(Json(json!({
    "message": "Subject approved and associated with news item",
    "subject": subject,
  })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subjects/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let message = match subjects::delete(state.store.as_ref(), id).await? {
    SubjectStatus::Approved => "Approved subject deleted successfully",
    SubjectStatus::Created => "Subject deleted successfully",
  };
  Ok(Json(json!({ "message": message })))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /subjects/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let subject: Subject = subjects::get(state.store.as_ref(), id).await?;
  Ok((guard.refreshed, Json(subject)))
}

/// `GET /subjects/{id}/news`: articles currently tagged with the subject.
pub async fn news<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let articles: Vec<Article> = subjects::articles(state.store.as_ref(), id).await?;
  Ok((guard.refreshed, Json(articles)))
}

/// `GET /subjects`: approved first, then the moderation queue.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let subjects = subjects::list_for_staff(state.store.as_ref()).await?;
  Ok((guard.refreshed, Json(subjects)))
}

/// `GET /subjects/approve/approved`
pub async fn list_approved<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: NewsroomStore,
{
  Ok(Json(subjects::list_approved(state.store.as_ref()).await?))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub name: String,
}

/// `GET /subjects/search?name=`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Params(params): Params<SearchParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let hits = subjects::search(state.store.as_ref(), &params.name, false).await?;
  Ok((guard.refreshed, Json(hits)))
}

/// `GET /subjects/approved-search?name=`
pub async fn search_approved<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
  Params(params): Params<SearchParams>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: NewsroomStore,
{
  Ok(Json(subjects::search(state.store.as_ref(), &params.name, true).await?))
}
