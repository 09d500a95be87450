//! Subject registry operations.

use std::cmp::Reverse;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  article::Article,
  store::{ArticleQuery, NewsroomStore, SubjectQuery},
  subject::{NewSubject, Subject, SubjectPatch, SubjectStatus},
};

async fn load<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Subject> {
  store
    .get_subject(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::SubjectNotFound(id))
}

pub async fn create<S: NewsroomStore>(
  store: &S,
  input: NewSubject,
) -> Result<Subject> {
  if input.name.trim().is_empty() {
    return Err(Error::MissingField("name"));
  }
  let subject = store.add_subject(input).await.map_err(Error::store)?;
  info!(subject_id = %subject.subject_id, name = %subject.name, "subject created");
  Ok(subject)
}

pub async fn get<S: NewsroomStore>(store: &S, id: Uuid) -> Result<Subject> {
  load(store, id).await
}

pub async fn update<S: NewsroomStore>(
  store: &S,
  id: Uuid,
  patch: SubjectPatch,
) -> Result<Subject> {
  if patch.name.trim().is_empty() {
    return Err(Error::MissingField("name"));
  }
  let mut subject = load(store, id).await?;
  subject.apply(patch)?;
  store.save_subject(&subject).await.map_err(Error::store)?;
  Ok(subject)
}

/// Approve a subject against a published article, freezing a snapshot of it
/// into the article.
pub async fn approve<S: NewsroomStore>(
  store: &S,
  subject_id: Uuid,
  article_id: Uuid,
) -> Result<Subject> {
  store
    .get_article(article_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ArticleNotFound(article_id))?
    .ensure_published()?;
  let mut subject = load(store, subject_id).await?;

  if subject.approve(Utc::now()) {
    store.save_subject(&subject).await.map_err(Error::store)?;
  }
  store
    .attach_snapshot(article_id, &subject.snapshot())
    .await
    .map_err(Error::store)?;
  info!(%subject_id, %article_id, "subject approved");
  Ok(subject)
}

/// Delete a subject regardless of status. Returns the status it had.
pub async fn delete<S: NewsroomStore>(
  store: &S,
  id: Uuid,
) -> Result<SubjectStatus> {
  let subject = load(store, id).await?;
  if !store.delete_subject(id).await.map_err(Error::store)? {
    return Err(Error::SubjectNotFound(id));
  }
  info!(subject_id = %id, status = %subject.status, "subject deleted");
  Ok(subject.status)
}

/// Articles whose live subject list references `id`.
pub async fn articles<S: NewsroomStore>(
  store: &S,
  id: Uuid,
) -> Result<Vec<Article>> {
  let query = ArticleQuery { subject_id: Some(id), ..Default::default() };
  store.list_articles(&query).await.map_err(Error::store)
}

/// The editorial listing: approved subjects by name descending, then created
/// subjects by name and creation time descending.
pub async fn list_for_staff<S: NewsroomStore>(store: &S) -> Result<Vec<Subject>> {
  let mut approved = store
    .list_subjects(&SubjectQuery {
      status: Some(SubjectStatus::Approved),
      ..Default::default()
    })
    .await
    .map_err(Error::store)?;
  approved.sort_by(|a, b| b.name.cmp(&a.name));

  let mut created = store
    .list_subjects(&SubjectQuery {
      status: Some(SubjectStatus::Created),
      ..Default::default()
    })
    .await
    .map_err(Error::store)?;
  created.sort_by_key(|s| Reverse((s.name.clone(), s.created_at)));

  approved.extend(created);
  Ok(approved)
}

/// The public listing: approved subjects only, by name ascending.
pub async fn list_approved<S: NewsroomStore>(store: &S) -> Result<Vec<Subject>> {
  let mut approved = store
    .list_subjects(&SubjectQuery {
      status: Some(SubjectStatus::Approved),
      ..Default::default()
    })
    .await
    .map_err(Error::store)?;
  approved.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(approved)
}

/// Case-insensitive substring search on the name.
pub async fn search<S: NewsroomStore>(
  store: &S,
  name: &str,
  approved_only: bool,
) -> Result<Vec<Subject>> {
  if name.trim().is_empty() {
    return Err(Error::MissingField("name"));
  }
  let query = SubjectQuery {
    status:        approved_only.then_some(SubjectStatus::Approved),
    name_contains: Some(name.to_owned()),
  };
  store.list_subjects(&query).await.map_err(Error::store)
}

/// Resolve names to subject ids, creating any subject that does not exist
/// yet. Order is preserved and every occurrence is resolved independently.
///
/// The lookup and the creation are separate store calls, so two concurrent
/// resolutions of the same new name can both create it.
pub async fn resolve_names<S: NewsroomStore>(
  store: &S,
  names: &[String],
) -> Result<Vec<Uuid>> {
  let mut ids = Vec::with_capacity(names.len());
  for name in names {
    let existing = store
      .find_subject_by_name(name)
      .await
      .map_err(Error::store)?;
    let subject = match existing {
      Some(s) => s,
      None => create(store, NewSubject::named(name.clone())).await?,
    };
    ids.push(subject.subject_id);
  }
  Ok(ids)
}
