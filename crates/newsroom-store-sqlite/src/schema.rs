//! SQL schema for the Newsroom SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS principals (
    principal_id  TEXT PRIMARY KEY,
    username      TEXT UNIQUE,     -- NULL for the anonymous visitor
    password_hash TEXT,            -- argon2 PHC string
    first_name    TEXT,
    last_name     TEXT,
    role          TEXT NOT NULL    -- 'admin' | 'reporter' | 'visitor'
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    maiden_name TEXT,
    children    TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    status      TEXT NOT NULL DEFAULT 'created',
    created_at  TEXT NOT NULL,
    approved_at TEXT
);

CREATE TABLE IF NOT EXISTS articles (
    article_id        TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    content           TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    published_at      TEXT,
    status            TEXT NOT NULL DEFAULT 'created',
    rejection_reason  TEXT,
    approved_subjects TEXT NOT NULL DEFAULT '[]',   -- JSON SubjectSnapshot list
    CHECK ((status = 'rejected') = (rejection_reason IS NOT NULL))
);

-- Live, ordered subject references. Deleting a subject drops its rows.
CREATE TABLE IF NOT EXISTS article_subjects (
    article_id TEXT    NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    subject_id TEXT    NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
    PRIMARY KEY (article_id, position)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id   TEXT PRIMARY KEY,
    content      TEXT NOT NULL,
    creator_name TEXT,
    created_at   TEXT NOT NULL,
    state        TEXT NOT NULL DEFAULT 'created',
    article_id   TEXT REFERENCES articles(article_id) ON DELETE SET NULL
);

-- Approved comments of an article, in approval order.
CREATE TABLE IF NOT EXISTS article_comments (
    article_id TEXT    NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    comment_id TEXT    NOT NULL REFERENCES comments(comment_id) ON DELETE CASCADE,
    PRIMARY KEY (article_id, position)
);

CREATE INDEX IF NOT EXISTS subjects_name_idx          ON subjects(name);
CREATE INDEX IF NOT EXISTS articles_status_idx        ON articles(status);
CREATE INDEX IF NOT EXISTS article_subjects_subj_idx  ON article_subjects(subject_id);
CREATE INDEX IF NOT EXISTS article_comments_cmt_idx   ON article_comments(comment_id);
CREATE INDEX IF NOT EXISTS comments_state_idx         ON comments(state);

PRAGMA user_version = 1;
";
