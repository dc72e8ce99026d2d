//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::{Category, PostId, PostRecord, SiteRecord, ThreadId, ThreadMeta};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Maximum number of bound parameters per `IN (...)` lookup
const ID_CHUNK: usize = 500;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns which of `ids` are present in the `id` column of `table`
    fn known_ids(&self, table: &str, ids: &[&str]) -> StorageResult<HashSet<String>> {
        let mut known = HashSet::new();

        for chunk in ids.chunks(ID_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT id FROM {} WHERE id IN ({})", table, placeholders);
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                row.get::<_, String>(0)
            })?;
            for row in rows {
                known.insert(row?);
            }
        }

        Ok(known)
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Known-ID Lookups =====

    fn unknown_posts(&self, ids: &[PostId]) -> StorageResult<HashSet<PostId>> {
        let raw: Vec<&str> = ids.iter().map(PostId::as_str).collect();
        let known = self.known_ids("posts", &raw)?;

        Ok(ids
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect())
    }

    fn unknown_threads(&self, ids: &[ThreadId]) -> StorageResult<HashSet<ThreadId>> {
        let raw: Vec<&str> = ids.iter().map(ThreadId::as_str).collect();
        let known = self.known_ids("threads", &raw)?;

        Ok(ids
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect())
    }

    // ===== Thread and Post Records =====

    fn store_thread(
        &mut self,
        site_id: &str,
        category: &Category,
        meta: &ThreadMeta,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO categories (id, site_id, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![category.id, site_id, category.name],
        )?;

        tx.execute(
            "INSERT INTO threads (id, site_id, category_id, title, creator_username, created_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                category_id = excluded.category_id,
                title = excluded.title,
                creator_username = excluded.creator_username,
                created_timestamp = excluded.created_timestamp",
            params![
                meta.thread_id.as_str(),
                site_id,
                category.id,
                meta.title,
                meta.creator_username,
                meta.created_timestamp,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn store_post(&mut self, site_id: &str, post: &PostRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO posts (id, thread_id, site_id, parent_post_id, title, username, posted_timestamp, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                thread_id = excluded.thread_id,
                parent_post_id = excluded.parent_post_id,
                title = excluded.title,
                username = excluded.username,
                posted_timestamp = excluded.posted_timestamp,
                content = excluded.content",
            params![
                post.id.as_str(),
                post.thread_id.as_str(),
                site_id,
                post.parent_id.as_ref().map(PostId::as_str),
                post.title,
                post.author,
                post.created_timestamp,
                post.content,
            ],
        )?;
        Ok(())
    }

    fn get_thread(&self, thread_id: &ThreadId) -> StorageResult<Option<ThreadMeta>> {
        let thread = self
            .conn
            .query_row(
                "SELECT t.id, t.category_id, COALESCE(c.name, ''), t.title, t.creator_username,
                 t.created_timestamp
                 FROM threads t LEFT JOIN categories c ON c.id = t.category_id
                 WHERE t.id = ?1",
                params![thread_id.as_str()],
                |row| {
                    Ok(ThreadMeta {
                        thread_id: ThreadId::new(row.get::<_, String>(0)?),
                        category: Category {
                            id: row.get(1)?,
                            name: row.get(2)?,
                        },
                        title: row.get(3)?,
                        creator_username: row.get(4)?,
                        created_timestamp: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(thread)
    }

    fn get_post(&self, post_id: &PostId) -> StorageResult<Option<PostRecord>> {
        let post = self
            .conn
            .query_row(
                "SELECT id, thread_id, parent_post_id, title, username, posted_timestamp, content
                 FROM posts WHERE id = ?1",
                params![post_id.as_str()],
                |row| {
                    Ok(PostRecord {
                        id: PostId::new(row.get::<_, String>(0)?),
                        thread_id: ThreadId::new(row.get::<_, String>(1)?),
                        parent_id: row.get::<_, Option<String>>(2)?.map(PostId::new),
                        title: row.get(3)?,
                        author: row.get(4)?,
                        created_timestamp: row.get(5)?,
                        content: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(post)
    }

    // ===== Supported Sites =====

    fn supported_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, secure FROM sites ORDER BY id")?;
        let mut sites = stmt
            .query_map([], |row| {
                Ok(SiteRecord {
                    id: row.get(0)?,
                    secure: row.get::<_, i64>(1)? != 0,
                    aliases: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut alias_stmt = self
            .conn
            .prepare("SELECT alias FROM site_aliases WHERE site_id = ?1 ORDER BY alias")?;
        for site in &mut sites {
            site.aliases = alias_stmt
                .query_map(params![site.id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
        }

        Ok(sites)
    }

    fn store_supported_sites(&mut self, sites: &[SiteRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM site_aliases", [])?;
        tx.execute("DELETE FROM sites", [])?;

        for site in sites {
            tx.execute(
                "INSERT INTO sites (id, secure) VALUES (?1, ?2)",
                params![site.id, site.secure as i64],
            )?;
            for alias in &site.aliases {
                tx.execute(
                    "INSERT OR IGNORE INTO site_aliases (site_id, alias) VALUES (?1, ?2)",
                    params![site.id, alias],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(RunStatus::Running),
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_sites(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM sites")
    }

    fn count_threads(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM threads")
    }

    fn count_posts(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts")
    }

    fn count_posts_by_site(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT site_id, COUNT(*) FROM posts GROUP BY site_id")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (site, count) = row?;
            counts.insert(site, count as u64);
        }

        Ok(counts)
    }
}
