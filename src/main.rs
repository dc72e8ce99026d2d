//! Forumwatch main entry point
//!
//! This is the command-line interface for the Forumwatch forum ingester.

use anyhow::Context;
use clap::Parser;
use forumwatch::config::{load_config_with_hash, Config};
use forumwatch::crawler::Coordinator;
use forumwatch::feed::WikidotFeed;
use forumwatch::output::{load_statistics, print_run_summary, print_statistics};
use forumwatch::remote::{build_http_client, WikidotThreadSource};
use forumwatch::storage::{open_storage, SqliteStorage, Storage};
use forumwatch::WatchError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Forumwatch: incremental forum post ingestion
///
/// Forumwatch reads the recent-posts feed of each configured site and
/// fetches only the threads and pages needed to store the new posts.
#[derive(Parser, Debug)]
#[command(name = "forumwatch")]
#[command(version)]
#[command(about = "Incremental forum post ingestion", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only run a pass over this site
    #[arg(long, value_name = "ID", conflicts_with_all = ["dry_run", "stats"])]
    site: Option<String>,

    /// Validate config and show what would be polled without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!(hash = %config_hash, "Configuration loaded");

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_watch(config, config_hash, cli.site.as_deref())
            .await
            .context("watch pass failed")?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forumwatch=info,warn"),
            1 => EnvFilter::new("forumwatch=debug,info"),
            2 => EnvFilter::new("forumwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be polled
fn handle_dry_run(config: &Config) {
    println!("=== Forumwatch Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Feed URL: {}", config.crawler.feed_url);
    println!("  AJAX URL: {}", config.crawler.ajax_url);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSites ({}):", config.sites.len());
    for site in config.site_records() {
        let feed_url = config.crawler.feed_url.replace("{site}", &site.id);
        println!("  - {} ({})", site.id, site.scheme());
        println!("    * feed: {}", feed_url);
        for alias in &site.aliases {
            println!("    * alias: {}", alias);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles a polling pass over every site, or just `only_site`
async fn handle_watch(
    config: Config,
    config_hash: String,
    only_site: Option<&str>,
) -> forumwatch::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    let sites = config.site_records();
    storage.store_supported_sites(&sites)?;
    tracing::info!(sites = sites.len(), "Supported sites recorded");

    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout),
    )?;
    let feed = WikidotFeed::new(client.clone(), config.crawler.feed_url.as_str());
    let source = WikidotThreadSource::new(client, config.crawler.ajax_url.as_str());
    let mut coordinator = Coordinator::new(feed, source, storage, config_hash);

    match only_site {
        Some(id) => {
            let Some(site) = sites.iter().find(|s| s.id == id) else {
                return Err(WatchError::UnknownSite(id.to_string()));
            };
            let report = coordinator.run_site(site).await?;
            tracing::info!(
                site = %report.site_id,
                posts = report.posts_stored,
                "Site pass complete"
            );
        }
        None => {
            let summary = coordinator.run_all().await?;
            print_run_summary(&summary);
            if !summary.is_success() {
                tracing::warn!(
                    failed_sites = summary.failures.len(),
                    "Some sites failed; they will be retried next pass"
                );
            }
        }
    }

    Ok(())
}
