//! Configuration module for Forumwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use forumwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("forumwatch.toml")).unwrap();
//! for site in &config.sites {
//!     println!("Watching {}", site.id);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SiteEntry, UserAgentConfig, DEFAULT_AJAX_URL,
    DEFAULT_FEED_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
