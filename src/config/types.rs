use crate::model::SiteRecord;
use serde::Deserialize;

/// Default recent-posts feed location; Wikidot serves feeds over plain HTTP
/// for every site, while HTTPS only works for secure sites
pub const DEFAULT_FEED_URL: &str = "http://{site}.wikidot.com/feed/forum/posts.xml";

/// Default AJAX module endpoint
pub const DEFAULT_AJAX_URL: &str = "{scheme}://{site}.wikidot.com/ajax-module-connector.php";

/// Main configuration structure for Forumwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl Config {
    /// The configured sites in the shape storage expects
    pub fn site_records(&self) -> Vec<SiteRecord> {
        self.sites.iter().map(SiteEntry::to_record).collect()
    }
}

/// Remote access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Timeout for each HTTP request (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Feed URL template; `{site}` is replaced by the site ID
    #[serde(rename = "feed-url", default = "default_feed_url")]
    pub feed_url: String,

    /// AJAX endpoint template; `{site}` and `{scheme}` are replaced
    #[serde(rename = "ajax-url", default = "default_ajax_url")]
    pub ajax_url: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            feed_url: default_feed_url(),
            ajax_url: default_ajax_url(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_ajax_url() -> String {
    DEFAULT_AJAX_URL.to_string()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A site whose forum is checked for new posts
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Wikidot site name, e.g. "scp-wiki"
    pub id: String,

    #[serde(default)]
    pub secure: bool,

    /// Other hostnames the site is reachable under
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl SiteEntry {
    pub fn to_record(&self) -> SiteRecord {
        SiteRecord {
            id: self.id.clone(),
            secure: self.secure,
            aliases: self.aliases.clone(),
        }
    }
}
