//! [`SqliteStore`]: the SQLite implementation of [`NewsroomStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use newsroom_core::{
  article::{Article, ArticleState, NewArticle},
  comment::{Comment, CommentState, NewComment},
  principal::{NewPrincipal, Principal},
  store::{ArticleQuery, CommentQuery, NewsroomStore, SubjectQuery},
  subject::{NewSubject, Subject, SubjectSnapshot, SubjectStatus},
};

use crate::{
  Error, Result,
  encode::{
    RawArticle, RawComment, RawPrincipal, RawSubject, encode_dt, encode_uuid,
    fold_case, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A newsroom store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_subjects(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn query_articles(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Article>> {
    let raws: Vec<RawArticle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawArticle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          load_links(conn, raw)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn query_comments(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn query_principal(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Option<Principal>> {
    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params.iter()),
              RawPrincipal::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }
}

// ─── SQL functions ───────────────────────────────────────────────────────────

/// `fold_case(text)`: Unicode lowercase. SQLite's own `LIKE` and `lower()`
/// only fold ASCII, so text searches compare `fold_case` of both sides.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  use rusqlite::functions::FunctionFlags;

  conn.create_scalar_function(
    "fold_case",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.as_deref().map(fold_case))
    },
  )
}

/// `fold_case(column) LIKE ?` with the matching parameter.
fn contains(column: &str, needle: &str) -> (String, String) {
  (
    format!("fold_case({column}) LIKE ? ESCAPE '\\'"),
    like_pattern(&fold_case(needle)),
  )
}

fn other(err: impl std::error::Error + Send + Sync + 'static) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

// ─── Join-table helpers ──────────────────────────────────────────────────────

/// Fill the ordered subject and comment id lists of an article row.
fn load_links(conn: &rusqlite::Connection, raw: &mut RawArticle) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "SELECT subject_id FROM article_subjects WHERE article_id = ?1 ORDER BY position",
  )?;
  raw.subjects = stmt
    .query_map(rusqlite::params![raw.article_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;

  let mut stmt = conn.prepare_cached(
    "SELECT comment_id FROM article_comments WHERE article_id = ?1 ORDER BY position",
  )?;
  raw.comments = stmt
    .query_map(rusqlite::params![raw.article_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(())
}

/// Replace the live subject rows of an article inside an open transaction.
fn write_subjects(
  tx: &rusqlite::Transaction<'_>,
  article_id: &str,
  subjects: &[String],
) -> rusqlite::Result<()> {
  tx.execute(
    "DELETE FROM article_subjects WHERE article_id = ?1",
    rusqlite::params![article_id],
  )?;
  for (position, subject_id) in subjects.iter().enumerate() {
    tx.execute(
      "INSERT INTO article_subjects (article_id, position, subject_id) VALUES (?1, ?2, ?3)",
      rusqlite::params![article_id, position as i64, subject_id],
    )?;
  }
  Ok(())
}

/// Column values of an article, encoded for writing.
struct ArticleRow {
  article_id:        String,
  title:             String,
  content:           String,
  created_at:        String,
  published_at:      Option<String>,
  status:            String,
  rejection_reason:  Option<String>,
  approved_subjects: String,
  subjects:          Vec<String>,
}

impl ArticleRow {
  fn encode(article: &Article) -> Result<Self> {
    Ok(Self {
      article_id:        encode_uuid(article.article_id),
      title:             article.title.clone(),
      content:           article.content.clone(),
      created_at:        encode_dt(article.created_at),
      published_at:      article.published_at.map(encode_dt),
      status:            article.status().to_string(),
      rejection_reason:  article.state.rejection_reason().map(str::to_owned),
      approved_subjects: serde_json::to_string(&article.approved_subjects)?,
      subjects:          article.subjects.iter().copied().map(encode_uuid).collect(),
    })
  }
}

/// `?, ?, ...` with `n` placeholders.
fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

fn where_clause(conds: &[String]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

// ─── NewsroomStore impl ──────────────────────────────────────────────────────

impl NewsroomStore for SqliteStore {
  type Error = Error;

  // ── Principals ────────────────────────────────────────────────────────────

  async fn add_principal(&self, input: NewPrincipal) -> Result<Principal> {
    let principal = Principal {
      principal_id:  Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      first_name:    input.first_name,
      last_name:     input.last_name,
      role:          input.role,
    };

    let id_str     = encode_uuid(principal.principal_id);
    let username   = principal.username.clone();
    let hash       = principal.password_hash.clone();
    let first_name = principal.first_name.clone();
    let last_name  = principal.last_name.clone();
    let role_str   = principal.role.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO principals
             (principal_id, username, password_hash, first_name, last_name, role)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, hash, first_name, last_name, role_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(principal)
  }

  async fn find_principal_by_username(&self, username: &str) -> Result<Option<Principal>> {
    self
      .query_principal(
        format!("SELECT {} FROM principals WHERE username = ?1", RawPrincipal::COLUMNS),
        vec![username.to_owned()],
      )
      .await
  }

  async fn find_anonymous_principal(&self) -> Result<Option<Principal>> {
    self
      .query_principal(
        format!(
          "SELECT {} FROM principals WHERE username IS NULL ORDER BY rowid LIMIT 1",
          RawPrincipal::COLUMNS
        ),
        Vec::new(),
      )
      .await
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id:  Uuid::new_v4(),
      name:        input.name,
      maiden_name: input.maiden_name,
      children:    input.children,
      status:      SubjectStatus::Created,
      created_at:  Utc::now(),
      approved_at: None,
    };

    let id_str       = encode_uuid(subject.subject_id);
    let name         = subject.name.clone();
    let maiden_name  = subject.maiden_name.clone();
    let children_str = serde_json::to_string(&subject.children)?;
    let status_str   = subject.status.to_string();
    let at_str       = encode_dt(subject.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, maiden_name, children, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, maiden_name, children_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let sql = format!("SELECT {} FROM subjects WHERE subject_id = ?1", RawSubject::COLUMNS);
    Ok(self.query_subjects(sql, vec![encode_uuid(id)]).await?.pop())
  }

  async fn find_subject_by_name(&self, name: &str) -> Result<Option<Subject>> {
    let sql = format!(
      "SELECT {} FROM subjects WHERE name = ?1 ORDER BY created_at, rowid LIMIT 1",
      RawSubject::COLUMNS
    );
    Ok(self.query_subjects(sql, vec![name.to_owned()]).await?.pop())
  }

  async fn save_subject(&self, subject: &Subject) -> Result<()> {
    let id_str       = encode_uuid(subject.subject_id);
    let name         = subject.name.clone();
    let maiden_name  = subject.maiden_name.clone();
    let children_str = serde_json::to_string(&subject.children)?;
    let status_str   = subject.status.to_string();
    let approved_str = subject.approved_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE subjects
             SET name = ?2, maiden_name = ?3, children = ?4, status = ?5, approved_at = ?6
           WHERE subject_id = ?1",
          rusqlite::params![id_str, name, maiden_name, children_str, status_str, approved_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_subject(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    // `article_subjects` rows go with it via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];

    if let Some(status) = query.status {
      conds.push("status = ?".into());
      params.push(status.to_string());
    }
    if let Some(name) = &query.name_contains {
      let (cond, param) = contains("name", name);
      conds.push(cond);
      params.push(param);
    }

    let sql = format!(
      "SELECT {} FROM subjects {} ORDER BY created_at, rowid",
      RawSubject::COLUMNS,
      where_clause(&conds)
    );
    self.query_subjects(sql, params).await
  }

  // ── Articles ──────────────────────────────────────────────────────────────

  async fn add_article(&self, input: NewArticle) -> Result<Article> {
    let article = Article {
      article_id:        Uuid::new_v4(),
      title:             input.title,
      content:           input.content,
      created_at:        Utc::now(),
      published_at:      None,
      state:             ArticleState::Created,
      subjects:          input.subjects,
      approved_subjects: Vec::new(),
      comments:          Vec::new(),
    };

    let row = ArticleRow::encode(&article)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO articles (
             article_id, title, content, created_at, published_at,
             status, rejection_reason, approved_subjects
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.article_id,
            row.title,
            row.content,
            row.created_at,
            row.published_at,
            row.status,
            row.rejection_reason,
            row.approved_subjects,
          ],
        )?;
        write_subjects(&tx, &row.article_id, &row.subjects)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(article)
  }

  async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
    let sql = format!("SELECT {} FROM articles WHERE article_id = ?1", RawArticle::COLUMNS);
    Ok(self.query_articles(sql, vec![encode_uuid(id)]).await?.pop())
  }

  async fn save_article(&self, article: &Article) -> Result<()> {
    let row = ArticleRow::encode(article)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE articles
             SET title = ?2, content = ?3, published_at = ?4, status = ?5,
                 rejection_reason = ?6
           WHERE article_id = ?1",
          rusqlite::params![
            row.article_id,
            row.title,
            row.content,
            row.published_at,
            row.status,
            row.rejection_reason,
          ],
        )?;
        write_subjects(&tx, &row.article_id, &row.subjects)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn attach_snapshot(
    &self,
    article_id: Uuid,
    snapshot: &SubjectSnapshot,
  ) -> Result<bool> {
    let id_str = encode_uuid(article_id);
    let snapshot = snapshot.clone();

    let attached = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let stored: Option<String> = tx
          .query_row(
            "SELECT approved_subjects FROM articles WHERE article_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(stored) = stored else {
          return Ok(false);
        };

        let mut snapshots: Vec<SubjectSnapshot> =
          serde_json::from_str(&stored).map_err(other)?;
        if snapshots.iter().any(|s| s.subject_id == snapshot.subject_id) {
          return Ok(false);
        }
        snapshots.push(snapshot);
        tx.execute(
          "UPDATE articles SET approved_subjects = ?2 WHERE article_id = ?1",
          rusqlite::params![id_str, serde_json::to_string(&snapshots).map_err(other)?],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(attached)
  }

  async fn link_comment(&self, article_id: Uuid, comment_id: Uuid) -> Result<()> {
    let article_str = encode_uuid(article_id);
    let comment_str = encode_uuid(comment_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let linked: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM article_comments
                           WHERE article_id = ?1 AND comment_id = ?2)",
          rusqlite::params![article_str, comment_str],
          |r| r.get(0),
        )?;
        if !linked {
          tx.execute(
            "INSERT INTO article_comments (article_id, position, comment_id)
             SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2
               FROM article_comments WHERE article_id = ?1",
            rusqlite::params![article_str, comment_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unlink_comment(&self, article_id: Uuid, comment_id: Uuid) -> Result<bool> {
    let article_str = encode_uuid(article_id);
    let comment_str = encode_uuid(comment_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM article_comments WHERE article_id = ?1 AND comment_id = ?2",
          rusqlite::params![article_str, comment_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];

    if !query.statuses.is_empty() {
      conds.push(format!("status IN ({})", placeholders(query.statuses.len())));
      params.extend(query.statuses.iter().map(ToString::to_string));
    }
    if let Some(title) = &query.title_contains {
      let (cond, param) = contains("title", title);
      conds.push(cond);
      params.push(param);
    }
    if let Some(content) = &query.content_contains {
      let (cond, param) = contains("content", content);
      conds.push(cond);
      params.push(param);
    }
    if let Some(subject_id) = query.subject_id {
      conds.push(
        "EXISTS (SELECT 1 FROM article_subjects s
                  WHERE s.article_id = articles.article_id AND s.subject_id = ?)"
          .into(),
      );
      params.push(encode_uuid(subject_id));
    }
    if let Some(range) = query.created_or_published_within {
      conds.push(
        "((created_at BETWEEN ? AND ?) OR (published_at BETWEEN ? AND ?))".into(),
      );
      let (start, end) = (encode_dt(range.start), encode_dt(range.end));
      params.extend([start.clone(), end.clone(), start, end]);
    }
    if let Some(range) = query.published_within {
      conds.push("published_at BETWEEN ? AND ?".into());
      params.extend([encode_dt(range.start), encode_dt(range.end)]);
    }

    let sql = format!(
      "SELECT {} FROM articles {} ORDER BY created_at, rowid",
      RawArticle::COLUMNS,
      where_clause(&conds)
    );
    self.query_articles(sql, params).await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id:   Uuid::new_v4(),
      content:      input.content,
      creator_name: input.creator_name,
      created_at:   Utc::now(),
      state:        CommentState::Created,
      article_id:   None,
    };

    let id_str    = encode_uuid(comment.comment_id);
    let content   = comment.content.clone();
    let creator   = comment.creator_name.clone();
    let at_str    = encode_dt(comment.created_at);
    let state_str = comment.state.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, content, creator_name, created_at, state)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, content, creator, at_str, state_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE comment_id = ?1", RawComment::COLUMNS);
    Ok(self.query_comments(sql, vec![encode_uuid(id)]).await?.pop())
  }

  async fn save_comment(&self, comment: &Comment) -> Result<()> {
    let id_str      = encode_uuid(comment.comment_id);
    let content     = comment.content.clone();
    let creator     = comment.creator_name.clone();
    let state_str   = comment.state.to_string();
    let article_str = comment.article_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE comments
             SET content = ?2, creator_name = ?3, state = ?4, article_id = ?5
           WHERE comment_id = ?1",
          rusqlite::params![id_str, content, creator, state_str, article_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn list_comments(&self, query: &CommentQuery) -> Result<Vec<Comment>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];

    if let Some(state) = query.state {
      conds.push("state = ?".into());
      params.push(state.to_string());
    }
    if let Some(ids) = &query.ids {
      if ids.is_empty() {
        return Ok(Vec::new());
      }
      conds.push(format!("comment_id IN ({})", placeholders(ids.len())));
      params.extend(ids.iter().copied().map(encode_uuid));
    }

    let sql = format!(
      "SELECT {} FROM comments {} ORDER BY created_at, rowid",
      RawComment::COLUMNS,
      where_clause(&conds)
    );
    self.query_comments(sql, params).await
  }
}
