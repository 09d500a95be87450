//! Article lifecycle operations.

use std::cmp::Reverse;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  article::{Article, ArticleChanges, ArticleStatus, NewArticle},
  store::{ArticleQuery, DateRange, NewsroomStore},
  workflow::subjects,
};

/// Input to [`create`]. Subjects are given by name.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
  pub title:    String,
  pub content:  String,
  pub subjects: Vec<String>,
}

/// Field overwrites for [`update`] and [`modify`]. `subjects`, when given,
/// replaces the whole live subject list.
#[derive(Debug, Clone, Default)]
pub struct ArticleEdit {
  pub title:    Option<String>,
  pub content:  Option<String>,
  pub subjects: Option<Vec<String>>,
}

/// Substring filters for [`search`]. At least one must be set.
#[derive(Debug, Clone, Default)]
pub struct TextFilter {
  pub title:   Option<String>,
  pub content: Option<String>,
}

async fn load<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  store
    .get_article(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ArticleNotFound(id))
}

async fn save<S: NewsroomStore>(store: &S, article: &Article) -> Result<()> {
  store.save_article(article).await.map_err(Error::store)
}

/// Validate an edit and resolve its subject names. A title or content that is
/// given must not be blank; this runs before any subject gets created.
async fn resolve<S: NewsroomStore>(
  store: &S,
  edit: ArticleEdit,
) -> Result<ArticleChanges> {
  if let Some(title) = &edit.title {
    required(title, "title")?;
  }
  if let Some(content) = &edit.content {
    required(content, "content")?;
  }
  let subjects = match edit.subjects {
    Some(names) => Some(subjects::resolve_names(store, &names).await?),
    None => None,
  };
  Ok(ArticleChanges { title: edit.title, content: edit.content, subjects })
}

fn required(value: &str, field: &'static str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

pub async fn create<S: NewsroomStore>(
  store: &S,
  draft: ArticleDraft,
) -> Result<Article> {
  required(&draft.title, "title")?;
  required(&draft.content, "content")?;
  let subjects = subjects::resolve_names(store, &draft.subjects).await?;
  let article = store
    .add_article(NewArticle { title: draft.title, content: draft.content, subjects })
    .await
    .map_err(Error::store)?;
  info!(article_id = %article.article_id, "news item created");
  Ok(article)
}

pub async fn get<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  load(store, id).await
}

/// Overwrite fields of an unpublished article without changing its status.
pub async fn update<S: NewsroomStore>(
  store: &S,
  id: Uuid,
  edit: ArticleEdit,
) -> Result<Article> {
  let mut article = load(store, id).await?;
  // Check before resolving names so a refused edit creates no subjects.
  if article.is_published() {
    return Err(Error::AlreadyPublished(id));
  }
  let changes = resolve(store, edit).await?;
  article.edit(changes)?;
  save(store, &article).await?;
  Ok(article)
}

pub async fn submit<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  let mut article = load(store, id).await?;
  article.submit()?;
  save(store, &article).await?;
  info!(article_id = %id, "news item submitted");
  Ok(article)
}

pub async fn accept<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  let mut article = load(store, id).await?;
  article.accept()?;
  save(store, &article).await?;
  info!(article_id = %id, "news item approved");
  Ok(article)
}

pub async fn reject<S: NewsroomStore>(
  store: &S,
  id: Uuid,
  reason: String,
) -> Result<Article> {
  required(&reason, "reason")?;
  let mut article = load(store, id).await?;
  article.reject(reason)?;
  save(store, &article).await?;
  info!(article_id = %id, "news item rejected");
  Ok(article)
}

/// Rework a rejected article and send it back to `submitted`.
pub async fn modify<S: NewsroomStore>(
  store: &S,
  id: Uuid,
  edit: ArticleEdit,
) -> Result<Article> {
  let mut article = load(store, id).await?;
  if article.status() != ArticleStatus::Rejected {
    return Err(Error::InvalidTransition {
      article_id: id,
      from:       article.status().as_str(),
      to:         ArticleStatus::Submitted.as_str(),
    });
  }
  let changes = resolve(store, edit).await?;
  article.modify(changes)?;
  save(store, &article).await?;
  info!(article_id = %id, "rejected news item modified and resubmitted");
  Ok(article)
}

pub async fn publish<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Article> {
  let mut article = load(store, id).await?;
  article.publish(Utc::now())?;
  save(store, &article).await?;
  info!(article_id = %id, "news item published");
  Ok(article)
}

/// The editorial listing: grouped by status in the order
/// created, submitted, approved, published; newest first within a group.
pub async fn list<S: NewsroomStore>(
  store: &S,
  range: Option<DateRange>,
) -> Result<Vec<Article>> {
  let query = ArticleQuery {
    statuses: ArticleStatus::LISTED.to_vec(),
    created_or_published_within: range,
    ..Default::default()
  };
  let mut articles = store.list_articles(&query).await.map_err(Error::store)?;
  articles.sort_by_key(|a| {
    let group = ArticleStatus::LISTED
      .iter()
      .position(|s| *s == a.status())
      .unwrap_or(ArticleStatus::LISTED.len());
    (group, Reverse(a.created_at), Reverse(a.published_at))
  });
  Ok(articles)
}

/// Case-insensitive substring search over title and/or content. When both
/// filters are given, both must match.
pub async fn search<S: NewsroomStore>(
  store: &S,
  filter: TextFilter,
  published_only: bool,
) -> Result<Vec<Article>> {
  let title = filter.title.filter(|t| !t.is_empty());
  let content = filter.content.filter(|c| !c.is_empty());
  if title.is_none() && content.is_none() {
    return Err(Error::MissingField("title or content"));
  }
  let query = ArticleQuery {
    statuses: if published_only {
      vec![ArticleStatus::Published]
    } else {
      Vec::new()
    },
    title_contains: title,
    content_contains: content,
    ..Default::default()
  };
  store.list_articles(&query).await.map_err(Error::store)
}

/// Published articles, most recently published first, optionally limited to
/// a publication window.
pub async fn list_published<S: NewsroomStore>(
  store: &S,
  range: Option<DateRange>,
) -> Result<Vec<Article>> {
  let query = ArticleQuery {
    statuses: vec![ArticleStatus::Published],
    published_within: range,
    ..Default::default()
  };
  let mut articles = store.list_articles(&query).await.map_err(Error::store)?;
  articles.sort_by_key(|a| Reverse(a.published_at));
  Ok(articles)
}
