//! Crawler coordinator - per-site and multi-site pass orchestration
//!
//! A site pass reads the site's feed, drops entries storage already knows,
//! plans the remaining work and executes it task by task against a fresh
//! `SeenState`. A full run walks every supported site in turn and records
//! the run in storage.

use crate::crawler::delta::compute_delta;
use crate::crawler::executor::{execute, TaskOutcome};
use crate::crawler::planner::plan;
use crate::crawler::CrawlError;
use crate::feed::{FeedOutcome, FeedSource};
use crate::model::SiteRecord;
use crate::remote::ThreadSource;
use crate::state::SeenState;
use crate::storage::{RunStatus, Storage};
use std::time::Instant;

/// Counters for one site pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub site_id: String,

    /// The feed could not be read; nothing else was attempted
    pub feed_unavailable: bool,

    /// Feed items dropped because their permalink was unusable
    pub malformed_items: usize,

    /// Feed entries read before filtering against storage
    pub feed_entries: usize,

    pub tasks_planned: usize,
    pub tasks_fetched: usize,
    pub tasks_skipped: usize,
    pub tasks_failed: usize,
    pub posts_stored: usize,
}

impl SiteReport {
    fn new(site_id: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            ..Self::default()
        }
    }
}

/// A site whose pass was stopped by an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFailure {
    pub site_id: String,
    pub error: String,
}

/// Outcome of a full run over every supported site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: i64,
    pub reports: Vec<SiteReport>,
    pub failures: Vec<SiteFailure>,
}

impl RunSummary {
    pub fn posts_stored(&self) -> usize {
        self.reports.iter().map(|r| r.posts_stored).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F, R, S> {
    feed: F,
    source: R,
    storage: S,
    config_hash: String,
}

impl<F, R, S> Coordinator<F, R, S>
where
    F: FeedSource,
    R: ThreadSource,
    S: Storage,
{
    /// Creates a new coordinator instance
    ///
    /// `config_hash` is stored with every run so runs can be traced back to
    /// the configuration that produced them.
    pub fn new(feed: F, source: R, storage: S, config_hash: impl Into<String>) -> Self {
        Self {
            feed,
            source,
            storage,
            config_hash: config_hash.into(),
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Runs one pass over a single site
    ///
    /// An unavailable feed is not an error: the pass ends with nothing
    /// planned and the site is retried next time. A failed remote fetch only
    /// abandons its own task. A storage error stops the pass.
    pub async fn run_site(&mut self, site: &SiteRecord) -> Result<SiteReport, CrawlError> {
        let mut report = SiteReport::new(&site.id);

        let entries = match self.feed.fetch(site).await {
            FeedOutcome::Entries { entries, malformed } => {
                report.malformed_items = malformed.len();
                entries
            }
            FeedOutcome::Unavailable { reason } => {
                tracing::warn!(site = %site.id, %reason, "Feed unavailable, skipping site this pass");
                report.feed_unavailable = true;
                return Ok(report);
            }
        };
        report.feed_entries = entries.len();

        let delta = compute_delta(&self.storage, entries)?;
        let tasks = plan(&delta.entries, &delta.new_threads);
        report.tasks_planned = tasks.len();

        tracing::info!(
            site = %site.id,
            new_posts = delta.entries.len(),
            new_threads = delta.new_threads.len(),
            tasks = tasks.len(),
            "Planned site pass"
        );

        let mut state = SeenState::new();
        for task in &tasks {
            match execute(site, task, &mut state, &self.source, &mut self.storage).await {
                Ok(TaskOutcome::Skipped) => report.tasks_skipped += 1,
                Ok(TaskOutcome::Fetched { posts }) => {
                    report.tasks_fetched += 1;
                    report.posts_stored += posts;
                }
                // Already logged by the executor; the next task may still succeed
                Err(CrawlError::RemoteFetch { .. }) => report.tasks_failed += 1,
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            site = %site.id,
            fetched = report.tasks_fetched,
            skipped = report.tasks_skipped,
            failed = report.tasks_failed,
            posts = report.posts_stored,
            "Finished site pass"
        );

        Ok(report)
    }

    /// Runs one pass over every supported site, one after another
    ///
    /// A site whose pass fails is recorded in the summary and the run moves
    /// on. Errors are only returned when the run itself cannot be tracked or
    /// the site list cannot be read.
    pub async fn run_all(&mut self) -> Result<RunSummary, CrawlError> {
        let run_id = self.storage.create_run(&self.config_hash)?;
        let start_time = Instant::now();
        tracing::info!(run_id, "Starting run");

        let sites = match self.storage.supported_sites() {
            Ok(sites) => sites,
            Err(e) => {
                if let Err(finish_err) = self.storage.finish_run(run_id, RunStatus::Failed) {
                    tracing::error!(run_id, error = %finish_err, "Failed to mark run as failed");
                }
                return Err(e.into());
            }
        };

        let mut summary = RunSummary {
            run_id,
            ..RunSummary::default()
        };

        for site in &sites {
            match self.run_site(site).await {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    tracing::error!(site = %site.id, error = %e, "Site pass failed");
                    summary.failures.push(SiteFailure {
                        site_id: site.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let status = if summary.is_success() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        self.storage.finish_run(run_id, status)?;

        tracing::info!(
            run_id,
            sites = sites.len(),
            failed_sites = summary.failures.len(),
            posts = summary.posts_stored(),
            elapsed_secs = start_time.elapsed().as_secs_f64(),
            "Run complete"
        );

        Ok(summary)
    }
}
