//! Task execution: fetching one planned task and persisting what it yields

use crate::crawler::CrawlError;
use crate::model::{CrawlTask, PostId, SiteRecord, ThreadItem};
use crate::remote::{ThreadCursor, ThreadSource};
use crate::state::SeenState;
use crate::storage::Storage;

/// What happened to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Already covered earlier in the pass; nothing was requested
    Skipped,

    /// Fetched to completion
    Fetched { posts: usize },
}

/// Executes a single crawl task against the pass state
///
/// Items are stored as they arrive, so a remote failure partway through a
/// thread keeps whatever was stored before it. Only a task that runs to
/// completion is recorded in `state`.
pub async fn execute<R, S>(
    site: &SiteRecord,
    task: &CrawlTask,
    state: &mut SeenState,
    source: &R,
    storage: &mut S,
) -> Result<TaskOutcome, CrawlError>
where
    R: ThreadSource,
    S: Storage + ?Sized,
{
    let post_id = task.post_id.as_ref().map(PostId::as_str);

    if state.should_skip(task) {
        tracing::debug!(
            site = %site.id,
            thread_id = %task.thread_id,
            post_id,
            "Skipping task already covered this pass"
        );
        return Ok(TaskOutcome::Skipped);
    }

    tracing::debug!(
        site = %site.id,
        thread_id = %task.thread_id,
        post_id,
        full_thread = task.is_full_thread(),
        "Fetching thread"
    );

    let mut cursor = source.thread(site, &task.thread_id, task.post_id.as_ref());
    let mut fetched: Vec<PostId> = Vec::new();
    let mut meta_stored = false;

    loop {
        let item = match cursor.next_item().await {
            Ok(Some(item)) => item,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(
                    site = %site.id,
                    thread_id = %task.thread_id,
                    post_id,
                    posts_stored = fetched.len(),
                    error = %err,
                    "Thread fetch failed, abandoning task"
                );
                return Err(CrawlError::RemoteFetch {
                    thread_id: task.thread_id.clone(),
                    post_id: task.post_id.clone(),
                    source: err,
                });
            }
        };

        match item {
            ThreadItem::Meta(meta) => {
                if meta_stored {
                    tracing::warn!(
                        site = %site.id,
                        thread_id = %task.thread_id,
                        post_id,
                        "Ignoring repeated thread metadata"
                    );
                    continue;
                }
                storage.store_thread(&site.id, &meta.category, &meta)?;
                meta_stored = true;
            }
            ThreadItem::Post(post) => {
                storage.store_post(&site.id, &post)?;
                fetched.push(post.id);
            }
        }
    }

    let posts = fetched.len();
    state.record(task, fetched);

    tracing::info!(
        site = %site.id,
        thread_id = %task.thread_id,
        post_id,
        posts,
        seen_posts = state.post_count(),
        seen_full_threads = state.full_thread_count(),
        "Fetched thread"
    );

    Ok(TaskOutcome::Fetched { posts })
}
