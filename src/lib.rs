//! Forumwatch: incremental discovery of new forum posts
//!
//! This crate polls the recent-posts feed of every supported site, works out
//! which posts are new, and fetches only the thread pages needed to record
//! those posts and their thread context, never repeating a remote fetch
//! within a single pass.

pub mod config;
pub mod crawler;
pub mod feed;
pub mod model;
pub mod output;
pub mod remote;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Forumwatch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Site '{0}' is not configured")]
    UnknownSite(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Forumwatch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlError};
pub use model::{
    CrawlTask, FeedEntry, PostId, PostRecord, SiteRecord, ThreadId, ThreadItem, ThreadMeta,
};
pub use state::SeenState;
