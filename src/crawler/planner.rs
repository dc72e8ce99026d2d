//! Crawl planning: turning new feed entries into ordered fetch tasks

use crate::model::{CrawlTask, FeedEntry, ThreadId};
use std::collections::HashSet;

/// Builds the ordered task list for a pass
///
/// Entries in new threads become full-thread tasks; entries in known
/// threads become page tasks for their post. Full-thread tasks are ordered
/// first so the posts they bring in let later page tasks be skipped.
/// Identical tasks are planned once.
///
/// # Example
///
/// ```
/// use forumwatch::crawler::plan;
/// use forumwatch::model::{CrawlTask, FeedEntry, PostId, ThreadId};
/// use std::collections::HashSet;
///
/// let entries = vec![
///     FeedEntry::new(ThreadId::new("t-1"), PostId::new("post-2")),
///     FeedEntry::new(ThreadId::new("t-2"), PostId::new("post-3")),
/// ];
/// let new_threads: HashSet<ThreadId> = [ThreadId::new("t-2")].into_iter().collect();
///
/// let tasks = plan(&entries, &new_threads);
/// assert_eq!(
///     tasks,
///     vec![
///         CrawlTask::full_thread(ThreadId::new("t-2")),
///         CrawlTask::page(ThreadId::new("t-1"), PostId::new("post-2")),
///     ]
/// );
/// ```
pub fn plan(entries: &[FeedEntry], new_threads: &HashSet<ThreadId>) -> Vec<CrawlTask> {
    let mut planned = HashSet::new();
    let mut tasks: Vec<CrawlTask> = entries
        .iter()
        .map(|entry| {
            if new_threads.contains(&entry.thread_id) {
                CrawlTask::full_thread(entry.thread_id.clone())
            } else {
                CrawlTask::page(entry.thread_id.clone(), entry.post_id.clone())
            }
        })
        .filter(|task| planned.insert(task.clone()))
        .collect();

    // Stable: feed order is kept within each group
    tasks.sort_by_key(|task| task.post_id.is_some());

    tasks
}
