//! Output module for reporting on ingested forum data
//!
//! This module handles:
//! - Loading database statistics (sites, threads, posts, latest run)
//! - Printing statistics and run summaries to stdout

pub mod stats;

pub use stats::{load_statistics, print_run_summary, print_statistics, ForumStatistics};
