use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds the HTTP client shared by the feed and thread sources
///
/// Plain HTTP stays allowed: feeds of non-secure sites are only served
/// that way.
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
