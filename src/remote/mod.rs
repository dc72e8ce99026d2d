//! Remote thread access
//!
//! A thread source turns a (thread, optional post) request into a cursor
//! that yields the thread's metadata followed by its posts in page order.
//! The cursor is single-pass and keeps its pagination state to itself.

mod client;
mod parser;
mod wikidot;

pub use client::{build_http_client, user_agent_string};
pub use parser::{parse_thread_page, ThreadPage};
pub use wikidot::{WikidotThreadCursor, WikidotThreadSource};

use crate::model::{PostId, SiteRecord, ThreadId, ThreadItem};
use thiserror::Error;

/// Errors that can occur while fetching a thread
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Invalid module response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Module returned status '{status}': {message}")]
    Module { status: String, message: String },

    #[error("Unexpected page structure: {0}")]
    Html(String),
}

/// A single-pass producer of thread items
#[allow(async_fn_in_trait)]
pub trait ThreadCursor {
    /// Returns the next item, fetching another page when needed
    ///
    /// `Ok(None)` marks the end of the thread. After an error the cursor is
    /// finished and keeps returning `Ok(None)`.
    async fn next_item(&mut self) -> Result<Option<ThreadItem>, RemoteError>;
}

/// Something that can fetch forum threads
pub trait ThreadSource {
    type Cursor: ThreadCursor;

    /// Starts fetching a thread
    ///
    /// With `post_id`, only the page containing that post is retrieved;
    /// without it, every page of the thread is.
    fn thread(
        &self,
        site: &SiteRecord,
        thread_id: &ThreadId,
        post_id: Option<&PostId>,
    ) -> Self::Cursor;
}
