//! Core data types shared by the feed, remote and storage layers
//!
//! All of these values live for a single pass over a single site, except
//! `PostRecord` and `ThreadMeta`, which are what ends up in storage.

mod ids;

pub use ids::{PostId, ThreadId};

/// A (thread, post) pair surfaced by a site's recent-posts feed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedEntry {
    pub thread_id: ThreadId,
    pub post_id: PostId,
}

impl FeedEntry {
    pub fn new(thread_id: ThreadId, post_id: PostId) -> Self {
        Self { thread_id, post_id }
    }
}

/// A unit of remote work
///
/// `post_id == None` means "fetch the whole thread"; `Some` means "fetch only
/// the page containing this post".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub thread_id: ThreadId,
    pub post_id: Option<PostId>,
}

impl CrawlTask {
    pub fn full_thread(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            post_id: None,
        }
    }

    pub fn page(thread_id: ThreadId, post_id: PostId) -> Self {
        Self {
            thread_id,
            post_id: Some(post_id),
        }
    }

    pub fn is_full_thread(&self) -> bool {
        self.post_id.is_none()
    }
}

/// Forum category a thread lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Thread metadata, taken from the first page of a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMeta {
    pub thread_id: ThreadId,
    pub category: Category,
    pub title: String,
    /// `None` when the thread was started by the system or a deleted account
    pub creator_username: Option<String>,
    /// Unix timestamp (seconds)
    pub created_timestamp: i64,
}

/// A single post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: PostId,
    pub thread_id: ThreadId,
    pub parent_id: Option<PostId>,
    pub title: Option<String>,
    pub author: String,
    /// Unix timestamp (seconds)
    pub created_timestamp: i64,
    /// Post body as HTML
    pub content: String,
}

/// One element of a remote thread fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadItem {
    Meta(ThreadMeta),
    Post(PostRecord),
}

/// A supported site and the hostnames it is also known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    pub id: String,
    /// Whether the site is served over HTTPS
    pub secure: bool,
    pub aliases: Vec<String>,
}

impl SiteRecord {
    pub fn new(id: impl Into<String>, secure: bool) -> Self {
        Self {
            id: id.into(),
            secure,
            aliases: Vec::new(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}
