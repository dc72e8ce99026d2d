//! Delta computation: which feed entries are new to storage

use crate::model::{FeedEntry, PostId, ThreadId};
use crate::storage::{Storage, StorageResult};
use std::collections::HashSet;

/// Feed entries not yet in storage, plus the threads that are new entirely
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Entries whose post is unknown, in feed order
    pub entries: Vec<FeedEntry>,

    /// Threads among `entries` that have never been stored at all
    pub new_threads: HashSet<ThreadId>,
}

/// Filters raw feed entries down to the ones storage does not know about
pub fn compute_delta<S>(storage: &S, entries: Vec<FeedEntry>) -> StorageResult<Delta>
where
    S: Storage + ?Sized,
{
    if entries.is_empty() {
        return Ok(Delta::default());
    }

    let post_ids: Vec<PostId> = entries.iter().map(|e| e.post_id.clone()).collect();
    let unknown_posts = storage.unknown_posts(&post_ids)?;

    let entries: Vec<FeedEntry> = entries
        .into_iter()
        .filter(|entry| unknown_posts.contains(&entry.post_id))
        .collect();

    let mut listed = HashSet::new();
    let thread_ids: Vec<ThreadId> = entries
        .iter()
        .filter(|entry| listed.insert(&entry.thread_id))
        .map(|entry| entry.thread_id.clone())
        .collect();
    let new_threads = storage.unknown_threads(&thread_ids)?;

    Ok(Delta {
        entries,
        new_threads,
    })
}
