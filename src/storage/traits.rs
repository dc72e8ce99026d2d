//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::{Category, PostId, PostRecord, SiteRecord, ThreadId, ThreadMeta};
use crate::storage::{RunRecord, RunStatus};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes of threads and posts are upserts keyed by ID, so storing the same
/// record twice leaves the same state as storing it once.
pub trait Storage {
    // ===== Known-ID Lookups =====

    /// Returns the subset of `ids` that has never been stored
    fn unknown_posts(&self, ids: &[PostId]) -> StorageResult<HashSet<PostId>>;

    /// Returns the subset of `ids` that has never been stored
    fn unknown_threads(&self, ids: &[ThreadId]) -> StorageResult<HashSet<ThreadId>>;

    // ===== Thread and Post Records =====

    /// Stores a thread and its category
    ///
    /// # Arguments
    ///
    /// * `site_id` - The site the thread belongs to
    /// * `category` - The category the thread is filed under
    /// * `meta` - The thread metadata
    fn store_thread(
        &mut self,
        site_id: &str,
        category: &Category,
        meta: &ThreadMeta,
    ) -> StorageResult<()>;

    /// Stores a post, replacing any existing post with the same ID
    fn store_post(&mut self, site_id: &str, post: &PostRecord) -> StorageResult<()>;

    /// Gets a thread by ID
    fn get_thread(&self, thread_id: &ThreadId) -> StorageResult<Option<ThreadMeta>>;

    /// Gets a post by ID
    fn get_post(&self, post_id: &PostId) -> StorageResult<Option<PostRecord>>;

    // ===== Supported Sites =====

    /// Lists every site whose forum should be checked
    fn supported_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Replaces the full set of supported sites and their aliases
    fn store_supported_sites(&mut self, sites: &[SiteRecord]) -> StorageResult<()>;

    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with the given status
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    fn count_sites(&self) -> StorageResult<u64>;

    fn count_threads(&self) -> StorageResult<u64>;

    fn count_posts(&self) -> StorageResult<u64>;

    /// Gets post counts keyed by site ID
    fn count_posts_by_site(&self) -> StorageResult<HashMap<String, u64>>;
}
