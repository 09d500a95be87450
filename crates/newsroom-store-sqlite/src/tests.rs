//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone as _, Utc};
use newsroom_core::{
  Error as CoreError,
  article::{ArticleStatus, NewArticle},
  comment::{CommentState, NewComment},
  principal::{NewPrincipal, Role},
  store::{ArticleQuery, CommentQuery, DateRange, NewsroomStore, SubjectQuery},
  subject::{NewSubject, SubjectPatch, SubjectStatus},
  workflow::{
    articles::{self, ArticleDraft, ArticleEdit, TextFilter},
    comments, subjects,
  },
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn draft(title: &str, subjects: &[&str]) -> ArticleDraft {
  ArticleDraft {
    title:    title.into(),
    content:  format!("{title} content"),
    subjects: subjects.iter().map(|s| s.to_string()).collect(),
  }
}

/// Drive a fresh article all the way to `published`.
async fn published(s: &SqliteStore, title: &str) -> Uuid {
  let article = articles::create(s, draft(title, &[])).await.unwrap();
  let id = article.article_id;
  articles::submit(s, id).await.unwrap();
  articles::accept(s, id).await.unwrap();
  articles::publish(s, id).await.unwrap();
  id
}

// ─── Principals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_principal_by_username() {
  let s = store().await;
  let added = s
    .add_principal(NewPrincipal {
      username:      Some("GoGuy123".into()),
      password_hash: Some("$argon2id$hash".into()),
      first_name:    Some("John".into()),
      last_name:     Some("Doe".into()),
      role:          Role::Admin,
    })
    .await
    .unwrap();

  let found = s.find_principal_by_username("GoGuy123").await.unwrap().unwrap();
  assert_eq!(found.principal_id, added.principal_id);
  assert_eq!(found.role, Role::Admin);
  assert_eq!(found.password_hash.as_deref(), Some("$argon2id$hash"));

  assert!(s.find_principal_by_username("goguy123").await.unwrap().is_none());
}

#[tokio::test]
async fn anonymous_principal_is_found_once_created() {
  let s = store().await;
  assert!(s.find_anonymous_principal().await.unwrap().is_none());

  let visitor = s.add_principal(NewPrincipal::visitor()).await.unwrap();
  let found = s.find_anonymous_principal().await.unwrap().unwrap();
  assert_eq!(found.principal_id, visitor.principal_id);
  assert!(found.is_anonymous());
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_subject() {
  let s = store().await;
  let subject = s
    .add_subject(NewSubject {
      name:        "Science".into(),
      maiden_name: Some("Scientific Studies".into()),
      children:    vec!["Physics".into(), "Chemistry".into()],
    })
    .await
    .unwrap();
  assert_eq!(subject.status, SubjectStatus::Created);

  let fetched = s.get_subject(subject.subject_id).await.unwrap().unwrap();
  assert_eq!(fetched, subject);
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subject(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn subject_name_search_is_case_insensitive_and_literal() {
  let s = store().await;
  subjects::create(&s, NewSubject::named("Science")).await.unwrap();
  subjects::create(&s, NewSubject::named("Neuroscience")).await.unwrap();
  subjects::create(&s, NewSubject::named("100% Sport")).await.unwrap();

  let hits = subjects::search(&s, "SCIENCE", false).await.unwrap();
  assert_eq!(hits.len(), 2);

  let hits = subjects::search(&s, "%", false).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "100% Sport");

  assert!(subjects::search(&s, "science", true).await.unwrap().is_empty());
}

#[tokio::test]
async fn subject_name_search_folds_non_ascii_case() {
  let s = store().await;
  subjects::create(&s, NewSubject::named("Ελλάδα")).await.unwrap();
  subjects::create(&s, NewSubject::named("Über")).await.unwrap();
  subjects::create(&s, NewSubject::named("ΑΘΉΝΑ")).await.unwrap();

  let hits = subjects::search(&s, "ελλάδα", false).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Ελλάδα");

  let hits = subjects::search(&s, "über", false).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Über");

  let hits = subjects::search(&s, "αθήν", false).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "ΑΘΉΝΑ");
}

#[tokio::test]
async fn update_is_refused_once_approved() {
  let s = store().await;
  let subject = subjects::create(&s, NewSubject::named("Science")).await.unwrap();
  let article_id = published(&s, "Breakthrough").await;

  let patch = SubjectPatch {
    name:        "Sciences".into(),
    maiden_name: None,
    children:    Some(vec!["Biology".into()]),
  };
  let updated = subjects::update(&s, subject.subject_id, patch.clone()).await.unwrap();
  assert_eq!(updated.name, "Sciences");
  assert_eq!(updated.children, vec!["Biology".to_string()]);

  subjects::approve(&s, subject.subject_id, article_id).await.unwrap();
  let result = subjects::update(&s, subject.subject_id, patch).await;
  assert!(matches!(result, Err(CoreError::SubjectLocked(_))));
}

#[tokio::test]
async fn approval_requires_published_article() {
  let s = store().await;
  let subject = subjects::create(&s, NewSubject::named("Science")).await.unwrap();
  let draft = articles::create(&s, draft("Draft", &[])).await.unwrap();

  let result = subjects::approve(&s, subject.subject_id, draft.article_id).await;
  assert!(matches!(result, Err(CoreError::NotPublished(_))));

  let stored = s.get_subject(subject.subject_id).await.unwrap().unwrap();
  assert_eq!(stored.status, SubjectStatus::Created);
}

#[tokio::test]
async fn approval_snapshots_subject_into_article_once() {
  let s = store().await;
  let subject = subjects::create(&s, NewSubject::named("Science")).await.unwrap();
  let first = published(&s, "First").await;
  let second = published(&s, "Second").await;

  let approved = subjects::approve(&s, subject.subject_id, first).await.unwrap();
  let stamped = approved.approved_at;
  assert!(stamped.is_some());
  subjects::approve(&s, subject.subject_id, first).await.unwrap();
  let again = subjects::approve(&s, subject.subject_id, second).await.unwrap();
  assert_eq!(again.approved_at, stamped);

  let first = s.get_article(first).await.unwrap().unwrap();
  assert_eq!(first.approved_subjects.len(), 1);
  assert_eq!(first.approved_subjects[0].status, SubjectStatus::Approved);
  let second = s.get_article(second).await.unwrap().unwrap();
  assert_eq!(second.approved_subjects.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subject_approvals_keep_every_snapshot() {
  let s = store().await;
  let article_id = published(&s, "Roundup").await;
  let mut ids = Vec::new();
  for n in 0..12 {
    let subject = subjects::create(&s, NewSubject::named(format!("Topic {n}")))
      .await
      .unwrap();
    ids.push(subject.subject_id);
  }

  let tasks: Vec<_> = ids
    .iter()
    .map(|&id| {
      let s = s.clone();
      tokio::spawn(async move { subjects::approve(&s, id, article_id).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.approved_subjects.len(), ids.len());
  for id in &ids {
    assert!(article.approved_subjects.iter().any(|snap| snap.subject_id == *id));
  }
}

#[tokio::test]
async fn deleting_subject_strips_live_refs_but_keeps_snapshots() {
  let s = store().await;
  let article = articles::create(&s, draft("Lab notes", &["Physics", "Chemistry"]))
    .await
    .unwrap();
  let physics = article.subjects[0];
  let chemistry = article.subjects[1];

  articles::submit(&s, article.article_id).await.unwrap();
  articles::accept(&s, article.article_id).await.unwrap();
  articles::publish(&s, article.article_id).await.unwrap();
  subjects::approve(&s, physics, article.article_id).await.unwrap();

  let status = subjects::delete(&s, physics).await.unwrap();
  assert_eq!(status, SubjectStatus::Approved);

  let stored = s.get_article(article.article_id).await.unwrap().unwrap();
  assert_eq!(stored.subjects, vec![chemistry]);
  assert_eq!(stored.approved_subjects.len(), 1);
  assert_eq!(stored.approved_subjects[0].subject_id, physics);

  let result = subjects::delete(&s, physics).await;
  assert!(matches!(result, Err(CoreError::SubjectNotFound(_))));
}

#[tokio::test]
async fn staff_listing_puts_approved_first() {
  let s = store().await;
  let a = subjects::create(&s, NewSubject::named("Arts")).await.unwrap();
  subjects::create(&s, NewSubject::named("Business")).await.unwrap();
  let c = subjects::create(&s, NewSubject::named("Culture")).await.unwrap();
  subjects::create(&s, NewSubject::named("Drama")).await.unwrap();

  let article_id = published(&s, "Review").await;
  subjects::approve(&s, a.subject_id, article_id).await.unwrap();
  subjects::approve(&s, c.subject_id, article_id).await.unwrap();

  let names: Vec<_> = subjects::list_for_staff(&s)
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.name)
    .collect();
  assert_eq!(names, ["Culture", "Arts", "Drama", "Business"]);

  let public: Vec<_> = subjects::list_approved(&s)
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.name)
    .collect();
  assert_eq!(public, ["Arts", "Culture"]);
}

#[tokio::test]
async fn list_subjects_filtered_by_status() {
  let s = store().await;
  subjects::create(&s, NewSubject::named("Arts")).await.unwrap();
  subjects::create(&s, NewSubject::named("Business")).await.unwrap();

  let created = s
    .list_subjects(&SubjectQuery {
      status: Some(SubjectStatus::Created),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(created.len(), 2);

  let approved = s
    .list_subjects(&SubjectQuery {
      status: Some(SubjectStatus::Approved),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(approved.is_empty());
}

// ─── Articles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_resolves_subject_names_in_order() {
  let s = store().await;
  let physics = subjects::create(&s, NewSubject::named("Physics")).await.unwrap();

  let article = articles::create(&s, draft("Atoms", &["Physics", "Chemistry"]))
    .await
    .unwrap();
  assert_eq!(article.status(), ArticleStatus::Created);
  assert_eq!(article.subjects.len(), 2);
  assert_eq!(article.subjects[0], physics.subject_id);

  let chemistry = s.find_subject_by_name("Chemistry").await.unwrap().unwrap();
  assert_eq!(article.subjects[1], chemistry.subject_id);

  let stored = s.get_article(article.article_id).await.unwrap().unwrap();
  assert_eq!(stored, article);
}

#[tokio::test]
async fn create_requires_title_and_content() {
  let s = store().await;
  let mut missing = draft("", &[]);
  let result = articles::create(&s, missing.clone()).await;
  assert!(matches!(result, Err(CoreError::MissingField("title"))));

  missing.title = "Title".into();
  missing.content = "  ".into();
  let result = articles::create(&s, missing).await;
  assert!(matches!(result, Err(CoreError::MissingField("content"))));
}

#[tokio::test]
async fn publish_only_from_approved_is_persisted() {
  let s = store().await;
  let article = articles::create(&s, draft("Early", &[])).await.unwrap();
  let id = article.article_id;

  let result = articles::publish(&s, id).await;
  assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.status(), ArticleStatus::Created);
  assert!(stored.published_at.is_none());

  articles::submit(&s, id).await.unwrap();
  articles::accept(&s, id).await.unwrap();
  let live = articles::publish(&s, id).await.unwrap();
  assert!(live.published_at.is_some());

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.status(), ArticleStatus::Published);
  assert_eq!(stored.published_at, live.published_at);

  let result = articles::update(&s, id, ArticleEdit::default()).await;
  assert!(matches!(result, Err(CoreError::AlreadyPublished(_))));
}

#[tokio::test]
async fn reject_then_modify_resubmits() {
  let s = store().await;
  let article = articles::create(&s, draft("Rough", &[])).await.unwrap();
  let id = article.article_id;
  articles::submit(&s, id).await.unwrap();

  let rejected = articles::reject(&s, id, "Needs sources".into()).await.unwrap();
  assert_eq!(rejected.state.rejection_reason(), Some("Needs sources"));
  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.status(), ArticleStatus::Rejected);
  assert_eq!(stored.state.rejection_reason(), Some("Needs sources"));

  let edit = ArticleEdit {
    title:    Some("Polished".into()),
    content:  None,
    subjects: Some(vec!["Economy".into()]),
  };
  let modified = articles::modify(&s, id, edit).await.unwrap();
  assert_eq!(modified.status(), ArticleStatus::Submitted);
  assert_eq!(modified.title, "Polished");
  assert_eq!(modified.content, "Rough content");
  assert_eq!(modified.subjects.len(), 1);

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.state.rejection_reason(), None);
}

#[tokio::test]
async fn edits_cannot_blank_title_or_content() {
  let s = store().await;
  let article = articles::create(&s, draft("Steady", &[])).await.unwrap();
  let id = article.article_id;

  let blank_title = ArticleEdit {
    title:    Some(String::new()),
    content:  None,
    subjects: Some(vec!["Fresh".into()]),
  };
  let result = articles::update(&s, id, blank_title).await;
  assert!(matches!(result, Err(CoreError::MissingField("title"))));

  let blank_content = ArticleEdit {
    title:    None,
    content:  Some("   ".into()),
    subjects: None,
  };
  let result = articles::update(&s, id, blank_content.clone()).await;
  assert!(matches!(result, Err(CoreError::MissingField("content"))));

  articles::reject(&s, id, "Weak".into()).await.unwrap();
  let result = articles::modify(&s, id, blank_content).await;
  assert!(matches!(result, Err(CoreError::MissingField("content"))));

  let stored = s.get_article(id).await.unwrap().unwrap();
  assert_eq!(stored.title, "Steady");
  assert_eq!(stored.content, "Steady content");
  assert_eq!(stored.status(), ArticleStatus::Rejected);
  assert!(s.find_subject_by_name("Fresh").await.unwrap().is_none());
}

#[tokio::test]
async fn modify_refuses_unrejected_without_creating_subjects() {
  let s = store().await;
  let article = articles::create(&s, draft("Fresh", &[])).await.unwrap();
  let edit = ArticleEdit {
    subjects: Some(vec!["Ghost".into()]),
    ..Default::default()
  };
  let result = articles::modify(&s, article.article_id, edit).await;
  assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
  assert!(s.find_subject_by_name("Ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn editorial_listing_groups_by_status_and_hides_rejected() {
  let s = store().await;
  let created = articles::create(&s, draft("Created", &[])).await.unwrap();
  let submitted = articles::create(&s, draft("Submitted", &[])).await.unwrap();
  articles::submit(&s, submitted.article_id).await.unwrap();
  let rejected = articles::create(&s, draft("Rejected", &[])).await.unwrap();
  articles::reject(&s, rejected.article_id, "No".into()).await.unwrap();
  let live = published(&s, "Published").await;

  let listed = articles::list(&s, None).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, [created.article_id, submitted.article_id, live]);
}

#[tokio::test]
async fn search_matches_title_and_content() {
  let s = store().await;
  articles::create(&s, draft("Election night", &[])).await.unwrap();
  let live = published(&s, "Election results").await;
  articles::create(&s, draft("Weather", &[])).await.unwrap();

  let filter = TextFilter { title: Some("election".into()), content: None };
  assert_eq!(articles::search(&s, filter.clone(), false).await.unwrap().len(), 2);

  let hits = articles::search(&s, filter, true).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].article_id, live);

  let both = TextFilter {
    title:   Some("election".into()),
    content: Some("results content".into()),
  };
  assert_eq!(articles::search(&s, both, false).await.unwrap().len(), 1);

  let result = articles::search(&s, TextFilter::default(), false).await;
  assert!(matches!(result, Err(CoreError::MissingField(_))));
}

#[tokio::test]
async fn articles_for_subject_follow_live_refs() {
  let s = store().await;
  let article = articles::create(&s, draft("Markets", &["Economy"])).await.unwrap();
  articles::create(&s, draft("Sport", &["Football"])).await.unwrap();

  let economy = s.find_subject_by_name("Economy").await.unwrap().unwrap();
  let found = subjects::articles(&s, economy.subject_id).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].article_id, article.article_id);
}

#[tokio::test]
async fn list_articles_by_status() {
  let s = store().await;
  s.add_article(NewArticle {
    title:    "Raw".into(),
    content:  "Body".into(),
    subjects: Vec::new(),
  })
  .await
  .unwrap();
  published(&s, "Out").await;

  let query = ArticleQuery {
    statuses: vec![ArticleStatus::Published],
    ..Default::default()
  };
  let live = s.list_articles(&query).await.unwrap();
  assert_eq!(live.len(), 1);
  assert_eq!(live[0].title, "Out");
  assert_eq!(s.list_articles(&ArticleQuery::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn article_search_folds_non_ascii_case() {
  let s = store().await;
  articles::create(
    &s,
    ArticleDraft {
      title:    "ΕΚΛΟΓΈΣ ΣΤΗΝ ΑΘΉΝΑ".into(),
      content:  "Straßenbahn ÖFFNET wieder".into(),
      subjects: Vec::new(),
    },
  )
  .await
  .unwrap();

  let by_title = TextFilter { title: Some("εκλογές".into()), content: None };
  assert_eq!(articles::search(&s, by_title, false).await.unwrap().len(), 1);

  let by_content = TextFilter { title: None, content: Some("öffnet".into()) };
  assert_eq!(articles::search(&s, by_content, false).await.unwrap().len(), 1);

  let miss = TextFilter { title: Some("θεσσαλονίκη".into()), content: None };
  assert!(articles::search(&s, miss, false).await.unwrap().is_empty());
}

/// Move an article's publication time into the past.
async fn backdate(s: &SqliteStore, id: Uuid, at: chrono::DateTime<Utc>) {
  let mut article = s.get_article(id).await.unwrap().unwrap();
  article.published_at = Some(at);
  s.save_article(&article).await.unwrap();
}

#[tokio::test]
async fn published_listing_honours_the_date_window() {
  let s = store().await;
  let old = published(&s, "Archive").await;
  let fresh = published(&s, "Today").await;
  let new_year = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
  backdate(&s, old, new_year).await;

  let window = DateRange {
    start: new_year - Duration::hours(1),
    end:   new_year + Duration::hours(1),
  };
  let hits = articles::list_published(&s, Some(window)).await.unwrap();
  let ids: Vec<_> = hits.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, vec![old]);

  let edges = DateRange { start: new_year, end: new_year };
  assert_eq!(articles::list_published(&s, Some(edges)).await.unwrap().len(), 1);

  let recent = DateRange {
    start: Utc::now() - Duration::hours(1),
    end:   Utc::now() + Duration::hours(1),
  };
  let hits = articles::list_published(&s, Some(recent)).await.unwrap();
  let ids: Vec<_> = hits.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, vec![fresh]);

  let all = articles::list_published(&s, None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, vec![fresh, old]);
}

#[tokio::test]
async fn editorial_listing_keeps_created_or_published_in_window() {
  let s = store().await;
  let old = published(&s, "Archive").await;
  let draft = articles::create(&s, draft("Draft", &[])).await.unwrap();
  let new_year = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
  backdate(&s, old, new_year).await;

  // Only the backdated publication falls in 2020; both were created today.
  let window = DateRange {
    start: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
    end:   Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap(),
  };
  let hits = articles::list(&s, Some(window)).await.unwrap();
  let ids: Vec<_> = hits.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, vec![old]);

  let recent = DateRange {
    start: Utc::now() - Duration::hours(1),
    end:   Utc::now() + Duration::hours(1),
  };
  let hits = articles::list(&s, Some(recent)).await.unwrap();
  let ids: Vec<_> = hits.iter().map(|a| a.article_id).collect();
  assert_eq!(ids, vec![draft.article_id, old]);

  let past = DateRange {
    start: Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
    end:   Utc.with_ymd_and_hms(2019, 12, 31, 0, 0, 0).unwrap(),
  };
  assert!(articles::list(&s, Some(past)).await.unwrap().is_empty());
}

// ─── Comments ────────────────────────────────────────────────────────────────

fn new_comment(content: &str) -> NewComment {
  NewComment { content: content.into(), creator_name: Some("reader".into()) }
}

#[tokio::test]
async fn comment_approval_requires_published_article() {
  let s = store().await;
  let comment = comments::submit(&s, new_comment("Nice")).await.unwrap();
  let draft = articles::create(&s, draft("Draft", &[])).await.unwrap();

  let result = comments::approve(&s, comment.comment_id, draft.article_id).await;
  assert!(matches!(result, Err(CoreError::NotPublished(_))));

  let stored = s.get_comment(comment.comment_id).await.unwrap().unwrap();
  assert_eq!(stored.state, CommentState::Created);
  let stored = s.get_article(draft.article_id).await.unwrap().unwrap();
  assert!(stored.comments.is_empty());
}

#[tokio::test]
async fn deleting_approved_comment_preserves_order() {
  let s = store().await;
  let article_id = published(&s, "Open thread").await;
  let mut ids = Vec::new();
  for text in ["one", "two", "three"] {
    let c = comments::submit(&s, new_comment(text)).await.unwrap();
    comments::approve(&s, c.comment_id, article_id).await.unwrap();
    ids.push(c.comment_id);
  }

  let state = comments::delete(&s, ids[1]).await.unwrap();
  assert_eq!(state, CommentState::Approved);

  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.comments, vec![ids[0], ids[2]]);
  assert!(s.get_comment(ids[1]).await.unwrap().is_none());

  let shown = comments::for_article(&s, article_id).await.unwrap();
  let contents: Vec<_> = shown.into_iter().map(|c| c.content).collect();
  assert_eq!(contents, ["one", "three"]);
}

#[tokio::test]
async fn approved_comment_cannot_be_edited_or_reapproved() {
  let s = store().await;
  let article_id = published(&s, "Thread").await;
  let comment = comments::submit(&s, new_comment("Frist")).await.unwrap();

  let edited = comments::edit(&s, comment.comment_id, "First".into()).await.unwrap();
  assert_eq!(edited.content, "First");

  let approved = comments::approve(&s, comment.comment_id, article_id).await.unwrap();
  assert_eq!(approved.article_id, Some(article_id));

  let result = comments::edit(&s, comment.comment_id, "Edited".into()).await;
  assert!(matches!(result, Err(CoreError::CommentAlreadyApproved(_))));
  let result = comments::approve(&s, comment.comment_id, article_id).await;
  assert!(matches!(result, Err(CoreError::CommentAlreadyApproved(_))));

  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.comments, vec![comment.comment_id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_comment_approvals_all_stay_linked() {
  let s = store().await;
  let article_id = published(&s, "Busy thread").await;
  let mut ids = Vec::new();
  for n in 0..32 {
    let c = comments::submit(&s, new_comment(&format!("comment {n}"))).await.unwrap();
    ids.push(c.comment_id);
  }

  let tasks: Vec<_> = ids
    .iter()
    .map(|&id| {
      let s = s.clone();
      tokio::spawn(async move { comments::approve(&s, id, article_id).await })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.comments.len(), ids.len());
  for id in &ids {
    assert!(article.comments.contains(id));
  }

  // Removal in the middle of the busy list leaves the rest linked.
  comments::delete(&s, ids[7]).await.unwrap();
  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.comments.len(), ids.len() - 1);
  assert!(!article.comments.contains(&ids[7]));
}

#[tokio::test]
async fn linking_a_comment_twice_keeps_one_entry() {
  let s = store().await;
  let article_id = published(&s, "Thread").await;
  let c = s.add_comment(new_comment("hello")).await.unwrap();

  s.link_comment(article_id, c.comment_id).await.unwrap();
  s.link_comment(article_id, c.comment_id).await.unwrap();
  let article = s.get_article(article_id).await.unwrap().unwrap();
  assert_eq!(article.comments, vec![c.comment_id]);

  assert!(s.unlink_comment(article_id, c.comment_id).await.unwrap());
  assert!(!s.unlink_comment(article_id, c.comment_id).await.unwrap());
}

#[tokio::test]
async fn comments_of_unpublished_article_are_not_found() {
  let s = store().await;
  let draft = articles::create(&s, draft("Hidden", &[])).await.unwrap();
  let result = comments::for_article(&s, draft.article_id).await;
  assert!(matches!(result, Err(CoreError::ArticleNotFound(_))));
}

#[tokio::test]
async fn list_comments_by_ids_and_state() {
  let s = store().await;
  let a = s.add_comment(new_comment("a")).await.unwrap();
  s.add_comment(new_comment("b")).await.unwrap();

  let by_id = s
    .list_comments(&CommentQuery { state: None, ids: Some(vec![a.comment_id]) })
    .await
    .unwrap();
  assert_eq!(by_id.len(), 1);
  assert_eq!(by_id[0].comment_id, a.comment_id);

  let none = s
    .list_comments(&CommentQuery { state: None, ids: Some(Vec::new()) })
    .await
    .unwrap();
  assert!(none.is_empty());

  let approved = comments::list_approved(&s).await.unwrap();
  assert!(approved.is_empty());
}
