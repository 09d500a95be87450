//! Comment moderation operations.

use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  article::Article,
  comment::{Comment, CommentState, NewComment, validate_content},
  store::{CommentQuery, NewsroomStore},
};

async fn load<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Comment> {
  store
    .get_comment(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CommentNotFound(id))
}

async fn load_article<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  store
    .get_article(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ArticleNotFound(id))
}

/// Record a new comment awaiting moderation. It is not linked to any article
/// until approved.
pub async fn submit<S: NewsroomStore>(
  store: &S,
  input: NewComment,
) -> Result<Comment> {
  validate_content(&input.content)?;
  store.add_comment(input).await.map_err(Error::store)
}

pub async fn edit<S: NewsroomStore>(
  store: &S,
  id: Uuid,
  content: String,
) -> Result<Comment> {
  let mut comment = load(store, id).await?;
  comment.edit(content)?;
  store.save_comment(&comment).await.map_err(Error::store)?;
  Ok(comment)
}

/// Approve a comment and append it to a published article's comment list.
pub async fn approve<S: NewsroomStore>(
  store: &S,
  comment_id: Uuid,
  article_id: Uuid,
) -> Result<Comment> {
  load_article(store, article_id).await?.ensure_published()?;
  let mut comment = load(store, comment_id).await?;

  comment.approve(article_id)?;
  store.save_comment(&comment).await.map_err(Error::store)?;
  store
    .link_comment(article_id, comment_id)
    .await
    .map_err(Error::store)?;
  info!(%comment_id, %article_id, "comment approved");
  Ok(comment)
}

/// Delete a comment. An approved comment is first detached from its article.
/// Returns the state the comment had.
pub async fn delete<S: NewsroomStore>(
  store: &S,
  id: Uuid,
) -> Result<CommentState> {
  let comment = load(store, id).await?;

  if let (CommentState::Approved, Some(article_id)) =
    (comment.state, comment.article_id)
  {
    store
      .unlink_comment(article_id, id)
      .await
      .map_err(Error::store)?;
  }

  if !store.delete_comment(id).await.map_err(Error::store)? {
    return Err(Error::CommentNotFound(id));
  }
  info!(comment_id = %id, state = %comment.state, "comment deleted");
  Ok(comment.state)
}

/// The comments attached to a published article, oldest first.
pub async fn for_article<S: NewsroomStore>(
  store: &S,
  article_id: Uuid,
) -> Result<Vec<Comment>> {
  let article = load_article(store, article_id).await?;
  if !article.is_published() {
    return Err(Error::ArticleNotFound(article_id));
  }
  let query = CommentQuery { state: None, ids: Some(article.comments.clone()) };
  let mut comments = store.list_comments(&query).await.map_err(Error::store)?;
  comments.sort_by_key(|c| c.created_at);
  Ok(comments)
}

pub async fn list_approved<S: NewsroomStore>(store: &S) -> Result<Vec<Comment>> {
  let query = CommentQuery { state: Some(CommentState::Approved), ids: None };
  store.list_comments(&query).await.map_err(Error::store)
}
