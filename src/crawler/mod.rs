//! Crawler module for incremental forum ingestion
//!
//! This module contains the core crawling logic, including:
//! - Filtering feed entries against what storage already knows
//! - Planning full-thread and single-page fetches
//! - Executing tasks while deduplicating within a pass
//! - Site-level and multi-site coordination

mod coordinator;
mod delta;
mod executor;
mod planner;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Coordinator, RunSummary, SiteFailure, SiteReport};
pub use delta::{compute_delta, Delta};
pub use executor::{execute, TaskOutcome};
pub use planner::plan;

use crate::model::{PostId, ThreadId};
use crate::remote::RemoteError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while executing crawl tasks
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A thread could not be fetched; only that task is abandoned
    #[error("Failed to fetch thread {thread_id}: {source}")]
    RemoteFetch {
        thread_id: ThreadId,
        post_id: Option<PostId>,
        source: RemoteError,
    },

    /// Storage failed; the site pass cannot continue
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
