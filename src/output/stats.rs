//! Statistics generation from the forum database
//!
//! This module provides functionality for extracting and displaying
//! ingestion statistics from the storage layer.

use crate::crawler::RunSummary;
use crate::storage::{RunRecord, Storage};

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct ForumStatistics {
    /// Number of supported sites
    pub sites: u64,

    /// Number of threads stored
    pub threads: u64,

    /// Number of posts stored
    pub posts: u64,

    /// Post counts per site, largest first
    pub posts_by_site: Vec<(String, u64)>,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> crate::Result<ForumStatistics> {
    let mut posts_by_site: Vec<(String, u64)> =
        storage.count_posts_by_site()?.into_iter().collect();
    posts_by_site.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ForumStatistics {
        sites: storage.count_sites()?,
        threads: storage.count_threads()?,
        posts: storage.count_posts()?,
        posts_by_site,
        latest_run: storage.get_latest_run()?,
    })
}

/// Seconds between a run's start and finish, when both parse
fn run_duration_seconds(run: &RunRecord) -> Option<i64> {
    let started = run.started_at.parse::<chrono::DateTime<chrono::Utc>>().ok()?;
    let finished = run
        .finished_at
        .as_ref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    Some((finished - started).num_seconds())
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ForumStatistics) {
    println!("=== Forum Statistics ===\n");

    println!("Overview:");
    println!("  Supported sites: {}", stats.sites);
    println!("  Threads stored: {}", stats.threads);
    println!("  Posts stored: {}", stats.posts);
    println!();

    if !stats.posts_by_site.is_empty() {
        println!("Posts by Site:");
        for (site, count) in &stats.posts_by_site {
            let percentage = if stats.posts > 0 {
                (*count as f64 / stats.posts as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", site, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            if let Some(seconds) = run_duration_seconds(run) {
                println!("  Duration: {}s", seconds);
            }
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No runs recorded yet."),
    }
}

/// Prints the outcome of a run to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run {} ===\n", summary.run_id);

    for report in &summary.reports {
        if report.feed_unavailable {
            println!("  {}: feed unavailable", report.site_id);
            continue;
        }
        println!(
            "  {}: {} posts stored ({} fetched, {} skipped, {} failed tasks)",
            report.site_id,
            report.posts_stored,
            report.tasks_fetched,
            report.tasks_skipped,
            report.tasks_failed
        );
        if report.malformed_items > 0 {
            println!("    {} malformed feed items dropped", report.malformed_items);
        }
    }

    for failure in &summary.failures {
        println!("  {}: FAILED ({})", failure.site_id, failure.error);
    }

    println!();
    println!("Total posts stored: {}", summary.posts_stored());
}
