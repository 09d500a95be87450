//! Handlers for `/news` endpoints: the article lifecycle.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `POST`  | `/news` | admin or reporter |
//! | `GET`   | `/news?startDate=&endDate=` | admin or reporter |
//! | `GET`   | `/news/{id}` | admin |
//! | `PATCH` | `/news/{id}` | admin or reporter |
//! | `PATCH` | `/news/submit/{id}` | admin or reporter |
//! | `PATCH` | `/news/accept/{id}` | admin |
//! | `PATCH` | `/news/reject/{id}` | admin |
//! | `PATCH` | `/news/modify/{id}` | admin |
//! | `PATCH` | `/news/publish/{id}` | admin |
//! | `GET`   | `/news/search?title=&content=` | admin or reporter |
//! | `GET`   | `/news/search-published?title=&content=` | visitor or anonymous |
//! | `GET`   | `/news/publish/published` | visitor or anonymous |
//! | `GET`   | `/news/publish/publishedByDate?startDate=&endDate=` | visitor or anonymous |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use newsroom_core::{
  article::Article,
  store::NewsroomStore,
  workflow::articles::{self, ArticleDraft, ArticleEdit, TextFilter},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
  AppState,
  error::ApiError,
  extract::{Body, Id, Params, date_range},
  guard::{AdminOnly, AdminOrReporter, VisitorOrAnonymous},
};

fn envelope(message: &str, news: &Article) -> Json<Value> {
  Json(json!({ "message": message, "news": news }))
}

// ─── Create / edit ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub title:    String,
  #[serde(default)]
  pub content:  String,
  /// Subject names; created on the fly when unknown.
  pub subjects: Option<Vec<String>>,
}

/// `POST /news`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Body(body): Body<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let draft = ArticleDraft {
    title:    body.title,
    content:  body.content,
    subjects: body.subjects.unwrap_or_default(),
  };
  let news = articles::create(state.store.as_ref(), draft).await?;
  Ok((
    StatusCode::CREATED,
    guard.refreshed,
    envelope("News created successfully", &news),
  ))
}

/// Body of `PATCH /news/{id}` and `PATCH /news/modify/{id}`.
#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub title:    Option<String>,
  pub content:  Option<String>,
  #[serde(alias = "subject")]
  pub subjects: Option<Vec<String>>,
}

impl From<EditBody> for ArticleEdit {
  fn from(b: EditBody) -> Self {
    ArticleEdit { title: b.title, content: b.content, subjects: b.subjects }
  }
}

/// `PATCH /news/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
  Body(body): Body<EditBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::update(state.store.as_ref(), id, body.into()).await?;
  Ok((guard.refreshed, envelope("News updated successfully", &news)))
}

/// `PATCH /news/modify/{id}`: only for rejected articles; resubmits them.
pub async fn modify<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
  Body(body): Body<EditBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::modify(state.store.as_ref(), id, body.into()).await?;
  Ok(envelope("News modified and resubmitted successfully", &news))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `PATCH /news/submit/{id}`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::submit(state.store.as_ref(), id).await?;
  Ok((guard.refreshed, envelope("News submitted successfully", &news)))
}

/// `PATCH /news/accept/{id}`
pub async fn accept<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::accept(state.store.as_ref(), id).await?;
  Ok(envelope("News approved successfully", &news))
}

/// `PATCH /news/reject/{id}`: body: `{"reason": "..."}` and nothing else.
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
  Body(body): Body<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  if body.keys().any(|k| k != "reason") {
    return Err(ApiError::BadRequest(
      "Only the rejection reason can be provided for rejected news".into(),
    ));
  }
  let reason = match body.get("reason") {
    Some(Value::String(reason)) if !reason.trim().is_empty() => reason.clone(),
    _ => {
      return Err(ApiError::BadRequest(
        "Rejection reason is required for rejected news".into(),
      ));
    }
  };
  let news = articles::reject(state.store.as_ref(), id, reason).await?;
  Ok(envelope("News rejected successfully", &news))
}

/// `PATCH /news/publish/{id}`
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::publish(state.store.as_ref(), id).await?;
  Ok(envelope("News published successfully", &news))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /news/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
) -> Result<Json<Article>, ApiError>
where
  S: NewsroomStore,
{
  Ok(Json(articles::get(state.store.as_ref(), id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateParams {
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
}

impl DateParams {
  fn range(&self) -> Result<Option<newsroom_core::store::DateRange>, ApiError> {
    date_range(self.start_date.as_deref(), self.end_date.as_deref())
  }
}

/// `GET /news[?startDate=&endDate=]`: the editorial listing.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Params(params): Params<DateParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::list(state.store.as_ref(), params.range()?).await?;
  Ok((guard.refreshed, Json(news)))
}

/// `GET /news/publish/published`
pub async fn list_published<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::list_published(state.store.as_ref(), None).await?;
  Ok(Json(json!({
    "message": format!("Found {} published news items.", news.len()),
    "count": news.len(),
    "publishedNews": news,
  })))
}

/// `GET /news/publish/publishedByDate[?startDate=&endDate=]`
pub async fn published_by_date<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
  Params(params): Params<DateParams>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: NewsroomStore,
{
  Ok(Json(
    articles::list_published(state.store.as_ref(), params.range()?).await?,
  ))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub title:   Option<String>,
  pub content: Option<String>,
}

impl From<SearchParams> for TextFilter {
  fn from(p: SearchParams) -> Self {
    TextFilter { title: p.title, content: p.content }
  }
}

/// `GET /news/search?title=&content=`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Params(params): Params<SearchParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let news = articles::search(state.store.as_ref(), params.into(), false).await?;
  Ok((guard.refreshed, Json(news)))
}

/// `GET /news/search-published?title=&content=`
pub async fn search_published<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
  Params(params): Params<SearchParams>,
) -> Result<Json<Vec<Article>>, ApiError>
where
  S: NewsroomStore,
{
  Ok(Json(
    articles::search(state.store.as_ref(), params.into(), true).await?,
  ))
}
