//! Recent-posts feed handling
//!
//! A feed source lists the (thread, post) pairs a site reports as recently
//! posted. Fetching never fails outright: a feed that cannot be retrieved is
//! an explicit `FeedOutcome::Unavailable`, and items whose permalink cannot
//! be parsed are dropped and reported individually.

mod permalink;
mod rss;

pub use permalink::parse_permalink;
pub use rss::WikidotFeed;

use crate::model::{FeedEntry, SiteRecord};
use thiserror::Error;

/// Errors that can occur while reading a feed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed feed item '{item}': {reason}")]
    MalformedItem { item: String, reason: String },
}

impl FeedError {
    pub fn malformed(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedItem {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

/// Result of fetching one site's feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The feed was read; `malformed` lists the items that were dropped
    Entries {
        entries: Vec<FeedEntry>,
        malformed: Vec<FeedError>,
    },

    /// The feed could not be retrieved or parsed at all
    Unavailable { reason: String },
}

/// A source of recently posted (thread, post) pairs for a site
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    async fn fetch(&self, site: &SiteRecord) -> FeedOutcome;
}
