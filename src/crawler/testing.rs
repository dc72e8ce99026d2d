//! In-memory feed, thread source and storage doubles for crawler tests

use crate::feed::{FeedOutcome, FeedSource};
use crate::model::{
    Category, CrawlTask, FeedEntry, PostId, PostRecord, SiteRecord, ThreadId, ThreadItem,
    ThreadMeta,
};
use crate::remote::{RemoteError, ThreadCursor, ThreadSource};
use crate::storage::{
    RunRecord, RunStatus, SqliteStorage, Storage, StorageError, StorageResult,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub fn meta(thread: u64) -> ThreadMeta {
    ThreadMeta {
        thread_id: ThreadId::from_numeric(thread),
        category: Category {
            id: "1".to_string(),
            name: "General".to_string(),
        },
        title: format!("Thread {}", thread),
        creator_username: Some("alice".to_string()),
        created_timestamp: 1_600_000_000,
    }
}

pub fn post(thread: u64, id: u64) -> PostRecord {
    PostRecord {
        id: PostId::from_numeric(id),
        thread_id: ThreadId::from_numeric(thread),
        parent_id: None,
        title: None,
        author: "bob".to_string(),
        created_timestamp: 1_600_000_000 + id as i64,
        content: format!("<p>post {}</p>", id),
    }
}

pub fn entry(thread: u64, post: u64) -> FeedEntry {
    FeedEntry::new(ThreadId::from_numeric(thread), PostId::from_numeric(post))
}

fn thread_items(thread: u64, posts: &[u64]) -> Vec<ThreadItem> {
    let mut items = vec![ThreadItem::Meta(meta(thread))];
    items.extend(posts.iter().map(|id| ThreadItem::Post(post(thread, *id))));
    items
}

/// Feed double with a fixed outcome per site
#[derive(Default)]
pub struct StaticFeed {
    outcomes: HashMap<String, FeedOutcome>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(mut self, site: &str, entries: Vec<FeedEntry>) -> Self {
        self.outcomes.insert(
            site.to_string(),
            FeedOutcome::Entries {
                entries,
                malformed: Vec::new(),
            },
        );
        self
    }

    pub fn with_outcome(mut self, site: &str, outcome: FeedOutcome) -> Self {
        self.outcomes.insert(site.to_string(), outcome);
        self
    }

    /// Site ids in the order their feeds were requested
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl FeedSource for StaticFeed {
    async fn fetch(&self, site: &SiteRecord) -> FeedOutcome {
        self.fetched.lock().unwrap().push(site.id.clone());
        self.outcomes
            .get(&site.id)
            .cloned()
            .unwrap_or(FeedOutcome::Entries {
                entries: Vec::new(),
                malformed: Vec::new(),
            })
    }
}

/// Thread source double serving scripted items and logging every request
#[derive(Default)]
pub struct ScriptedSource {
    threads: HashMap<ThreadId, Vec<ThreadItem>>,
    pages: HashMap<PostId, Vec<ThreadItem>>,
    failing: HashSet<ThreadId>,
    calls: Mutex<Vec<CrawlTask>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves metadata plus `posts` for any request on `thread`
    pub fn with_thread(self, thread: u64, posts: &[u64]) -> Self {
        self.with_items(thread, thread_items(thread, posts))
    }

    pub fn with_items(mut self, thread: u64, items: Vec<ThreadItem>) -> Self {
        self.threads.insert(ThreadId::from_numeric(thread), items);
        self
    }

    /// Serves metadata plus `posts` when `target` is requested directly
    pub fn with_page(mut self, thread: u64, target: u64, posts: &[u64]) -> Self {
        self.pages
            .insert(PostId::from_numeric(target), thread_items(thread, posts));
        self
    }

    /// Serves metadata plus `posts`, then fails
    pub fn failing_after(mut self, thread: u64, posts: &[u64]) -> Self {
        self.failing.insert(ThreadId::from_numeric(thread));
        self.with_thread(thread, posts)
    }

    pub fn calls(&self) -> Vec<CrawlTask> {
        self.calls.lock().unwrap().clone()
    }
}

impl ThreadSource for ScriptedSource {
    type Cursor = ScriptedCursor;

    fn thread(
        &self,
        _site: &SiteRecord,
        thread_id: &ThreadId,
        post_id: Option<&PostId>,
    ) -> ScriptedCursor {
        self.calls.lock().unwrap().push(CrawlTask {
            thread_id: thread_id.clone(),
            post_id: post_id.cloned(),
        });

        let items = post_id
            .and_then(|id| self.pages.get(id))
            .or_else(|| self.threads.get(thread_id))
            .cloned()
            .unwrap_or_default();

        ScriptedCursor {
            items: items.into(),
            fail_at_end: self.failing.contains(thread_id),
        }
    }
}

pub struct ScriptedCursor {
    items: VecDeque<ThreadItem>,
    fail_at_end: bool,
}

impl ThreadCursor for ScriptedCursor {
    async fn next_item(&mut self) -> Result<Option<ThreadItem>, RemoteError> {
        if let Some(item) = self.items.pop_front() {
            return Ok(Some(item));
        }
        if self.fail_at_end {
            self.fail_at_end = false;
            return Err(RemoteError::Status(503));
        }
        Ok(None)
    }
}

/// SQLite storage whose writes fail for one site
pub struct FailingStorage {
    inner: SqliteStorage,
    failing_site: String,
}

impl FailingStorage {
    pub fn new(inner: SqliteStorage, failing_site: &str) -> Self {
        Self {
            inner,
            failing_site: failing_site.to_string(),
        }
    }

    fn check(&self, site_id: &str) -> StorageResult<()> {
        if site_id == self.failing_site {
            return Err(StorageError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                Some(format!("disk full for {}", site_id)),
            )));
        }
        Ok(())
    }
}

impl Storage for FailingStorage {
    fn unknown_posts(&self, ids: &[PostId]) -> StorageResult<HashSet<PostId>> {
        self.inner.unknown_posts(ids)
    }

    fn unknown_threads(&self, ids: &[ThreadId]) -> StorageResult<HashSet<ThreadId>> {
        self.inner.unknown_threads(ids)
    }

    fn store_thread(
        &mut self,
        site_id: &str,
        category: &Category,
        meta: &ThreadMeta,
    ) -> StorageResult<()> {
        self.check(site_id)?;
        self.inner.store_thread(site_id, category, meta)
    }

    fn store_post(&mut self, site_id: &str, post: &PostRecord) -> StorageResult<()> {
        self.check(site_id)?;
        self.inner.store_post(site_id, post)
    }

    fn get_thread(&self, thread_id: &ThreadId) -> StorageResult<Option<ThreadMeta>> {
        self.inner.get_thread(thread_id)
    }

    fn get_post(&self, post_id: &PostId) -> StorageResult<Option<PostRecord>> {
        self.inner.get_post(post_id)
    }

    fn supported_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        self.inner.supported_sites()
    }

    fn store_supported_sites(&mut self, sites: &[SiteRecord]) -> StorageResult<()> {
        self.inner.store_supported_sites(sites)
    }

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.inner.create_run(config_hash)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        self.inner.finish_run(run_id, status)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        self.inner.get_latest_run()
    }

    fn count_sites(&self) -> StorageResult<u64> {
        self.inner.count_sites()
    }

    fn count_threads(&self) -> StorageResult<u64> {
        self.inner.count_threads()
    }

    fn count_posts(&self) -> StorageResult<u64> {
        self.inner.count_posts()
    }

    fn count_posts_by_site(&self) -> StorageResult<HashMap<String, u64>> {
        self.inner.count_posts_by_site()
    }
}
