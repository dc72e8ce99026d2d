//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Forumwatch database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Sites whose forums are checked
CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY,
    secure INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS site_aliases (
    site_id TEXT NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
    alias TEXT NOT NULL,
    UNIQUE(site_id, alias)
);

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL,
    name TEXT NOT NULL
);

-- Posts reference threads by ID only: a post may be stored before its
-- thread row when a fetch is cut short
CREATE TABLE IF NOT EXISTS threads (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL,
    category_id TEXT NOT NULL,
    title TEXT NOT NULL,
    creator_username TEXT,
    created_timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_threads_site ON threads(site_id);

CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    thread_id TEXT NOT NULL,
    site_id TEXT NOT NULL,
    parent_post_id TEXT,
    title TEXT,
    username TEXT NOT NULL,
    posted_timestamp INTEGER NOT NULL,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_thread ON posts(thread_id);
CREATE INDEX IF NOT EXISTS idx_posts_parent ON posts(parent_post_id);
CREATE INDEX IF NOT EXISTS idx_posts_timestamp ON posts(posted_timestamp);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
