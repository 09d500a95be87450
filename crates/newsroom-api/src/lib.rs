//! JSON REST API for the newsroom.
//!
//! Exposes an axum [`Router`] backed by any [`NewsroomStore`]. Every route is
//! gated by one of the extractors in [`guard`]; request bodies and query
//! strings go through [`extract`] so malformed input is always a 400.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = newsroom_api::api_router(AppState { store, tokens });
//! axum::serve(listener, app).await?;
//! ```

pub mod comments;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod guard;
pub mod news;
pub mod subjects;
pub mod users;

use std::sync::Arc;

use axum::{
  Json, Router,
  http::StatusCode,
  middleware,
  response::IntoResponse,
  routing::{get, patch, post},
};
use newsroom_core::store::NewsroomStore;
use serde_json::json;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

pub use credentials::TokenIssuer;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: NewsroomStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: NewsroomStore + Clone + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any)
    .expose_headers([axum::http::HeaderName::from_static(
      guard::REFRESHED_TOKEN_HEADER,
    )]);

  Router::new()
    // Users
    .route("/users/signup", post(users::signup::<S>))
    .route("/users/login", post(users::login::<S>))
    .route("/users/connect-as-visitor", post(users::connect_as_visitor::<S>))
    // Subjects
    .route("/subjects", get(subjects::list::<S>).post(subjects::create::<S>))
    .route("/subjects/search", get(subjects::search::<S>))
    .route("/subjects/approved-search", get(subjects::search_approved::<S>))
    .route("/subjects/approve", post(subjects::approve::<S>))
    .route("/subjects/approve/approved", get(subjects::list_approved::<S>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .patch(subjects::update::<S>)
        .delete(subjects::delete_one::<S>),
    )
    .route("/subjects/{id}/news", get(subjects::news::<S>))
    // News
    .route("/news", get(news::list::<S>).post(news::create::<S>))
    .route("/news/search", get(news::search::<S>))
    .route("/news/search-published", get(news::search_published::<S>))
    .route("/news/publish/published", get(news::list_published::<S>))
    .route("/news/publish/publishedByDate", get(news::published_by_date::<S>))
    .route("/news/submit/{id}", patch(news::submit::<S>))
    .route("/news/accept/{id}", patch(news::accept::<S>))
    .route("/news/reject/{id}", patch(news::reject::<S>))
    .route("/news/modify/{id}", patch(news::modify::<S>))
    .route("/news/publish/{id}", patch(news::publish::<S>))
    .route("/news/{id}", get(news::get_one::<S>).patch(news::update::<S>))
    // Comments
    .route("/comments", post(comments::submit::<S>))
    .route("/comments/approve", post(comments::approve::<S>))
    .route("/comments/approve/approved", get(comments::list_approved::<S>))
    .route("/comments/news/{id}", get(comments::for_news::<S>))
    .route(
      "/comments/{id}",
      patch(comments::edit::<S>).delete(comments::delete_one::<S>),
    )
    .fallback(not_found)
    .method_not_allowed_fallback(method_not_allowed)
    .layer(middleware::from_fn_with_state(state.tokens.clone(), guard::identify))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn not_found() -> ApiError { ApiError::NotFound("Not found".into()) }

async fn method_not_allowed() -> impl IntoResponse {
  (
    StatusCode::METHOD_NOT_ALLOWED,
    Json(json!({ "message": "Method not allowed" })),
  )
}
