//! Handlers for `/comments` endpoints: reader comments and their moderation.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `POST`   | `/comments` | visitor or anonymous |
//! | `PATCH`  | `/comments/{id}` | visitor or anonymous |
//! | `POST`   | `/comments/approve` | admin |
//! | `DELETE` | `/comments/{id}` | admin |
//! | `GET`    | `/comments/news/{id}` | admin or reporter |
//! | `GET`    | `/comments/approve/approved` | visitor or anonymous |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use newsroom_core::{
  comment::{CommentState, NewComment, PublicComment},
  store::NewsroomStore,
  workflow::comments,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  error::ApiError,
  extract::{Body, Id, parse_id},
  guard::{AdminOnly, AdminOrReporter, VisitorOrAnonymous},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
  #[serde(default)]
  pub content:      String,
  pub creator_name: Option<String>,
}

/// `POST /comments`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
  Body(body): Body<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let input = NewComment { content: body.content, creator_name: body.creator_name };
  let comment = comments::submit(state.store.as_ref(), input).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Comment added successfully", "comment": comment })),
  ))
}

/// `PATCH /comments/{id}`: only while the comment awaits moderation.
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
  Id(id): Id,
  Body(body): Body<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let comment = comments::edit(state.store.as_ref(), id, body.content).await?;
  Ok(Json(json!({ "message": "Comment modified successfully", "comment": comment })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
  pub comment_id:   String,
  pub news_item_id: String,
}

/// `POST /comments/approve`: body: `{"commentId": ..., "newsItemId": ...}`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Body(body): Body<ApproveBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let comment_id = parse_id("commentId", &body.comment_id)?;
  let article_id = parse_id("newsItemId", &body.news_item_id)?;
  let comment = comments::approve(state.store.as_ref(), comment_id, article_id).await?;
  Ok(Json(json!({ "message": "Comment approved", "comment": comment })))
}

/// `DELETE /comments/{id}`: rejection of a pending comment is deletion.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _admin: AdminOnly,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let message = match comments::delete(state.store.as_ref(), id).await? {
    CommentState::Approved => {
      "Approved comment deleted and removed from the news item successfully"
    }
    CommentState::Created => "Comment rejected and deleted successfully",
  };
  Ok(Json(json!({ "message": message })))
}

/// `GET /comments/news/{id}`
pub async fn for_news<S>(
  State(state): State<AppState<S>>,
  guard: AdminOrReporter,
  Id(id): Id,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let comments = comments::for_article(state.store.as_ref(), id).await?;
  Ok((
    guard.refreshed,
    Json(json!({
      "message": "Comments retrieved successfully",
      "commentCount": comments.len(),
      "comments": comments,
    })),
  ))
}

/// `GET /comments/approve/approved`
pub async fn list_approved<S>(
  State(state): State<AppState<S>>,
  _visitor: VisitorOrAnonymous,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsroomStore,
{
  let comments: Vec<PublicComment> = comments::list_approved(state.store.as_ref())
    .await?
    .into_iter()
    .map(PublicComment::from)
    .collect();
  Ok(Json(json!({
    "message": "Approved comments retrieved successfully",
    "comments": comments,
  })))
}
