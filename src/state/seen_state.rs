use crate::model::{CrawlTask, PostId, ThreadId};
use std::collections::HashSet;

/// Tracks what has already been fetched during one site's pass
///
/// A fresh `SeenState` is created at the start of every site pass and
/// dropped at its end. Nothing in it survives across sites or passes.
#[derive(Debug, Clone, Default)]
pub struct SeenState {
    /// Every post received from any fetch in this pass
    pub seen_posts: HashSet<PostId>,

    /// Threads that have been fetched in full in this pass
    pub seen_full_threads: HashSet<ThreadId>,
}

impl SeenState {
    /// Creates an empty state for a new pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether executing this task would repeat work already done
    ///
    /// Nothing on a thread runs again once that thread has been fetched in
    /// full. A page task is also redundant once its target post has been
    /// seen, whichever thread it arrived with.
    ///
    /// A full-thread task is not skipped just because some of its posts were
    /// seen through page-level fetches.
    pub fn should_skip(&self, task: &CrawlTask) -> bool {
        if self.seen_full_threads.contains(&task.thread_id) {
            return true;
        }
        match &task.post_id {
            None => false,
            Some(post_id) => self.seen_posts.contains(post_id),
        }
    }

    /// Records the result of an executed task
    pub fn record<I>(&mut self, task: &CrawlTask, fetched_post_ids: I)
    where
        I: IntoIterator<Item = PostId>,
    {
        self.seen_posts.extend(fetched_post_ids);
        if task.is_full_thread() {
            self.seen_full_threads.insert(task.thread_id.clone());
        }
    }

    pub fn post_count(&self) -> usize {
        self.seen_posts.len()
    }

    pub fn full_thread_count(&self) -> usize {
        self.seen_full_threads.len()
    }
}
