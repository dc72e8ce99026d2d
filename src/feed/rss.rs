use crate::feed::{parse_permalink, FeedError, FeedOutcome, FeedSource};
use crate::model::{FeedEntry, SiteRecord};
use reqwest::Client;

/// Reads a Wikidot site's recent forum posts RSS feed
pub struct WikidotFeed {
    client: Client,
    /// URL template with a `{site}` placeholder
    url_template: String,
}

impl WikidotFeed {
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn feed_url(&self, site: &SiteRecord) -> String {
        self.url_template.replace("{site}", &site.id)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Unavailable(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Unavailable(format!("failed to read body: {}", e)))?;

        Ok(body.to_vec())
    }
}

impl FeedSource for WikidotFeed {
    async fn fetch(&self, site: &SiteRecord) -> FeedOutcome {
        let url = self.feed_url(site);

        let body = match self.download(&url).await {
            Ok(body) => body,
            Err(e) => {
                return FeedOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        let feed = match feed_rs::parser::parse(&body[..]) {
            Ok(feed) => feed,
            Err(e) => {
                return FeedOutcome::Unavailable {
                    reason: format!("failed to parse feed: {}", e),
                }
            }
        };

        let mut entries = Vec::with_capacity(feed.entries.len());
        let mut malformed = Vec::new();

        for item in &feed.entries {
            match entry_from_item(item) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(site = %site.id, error = %e, "Dropping malformed feed item");
                    malformed.push(e);
                }
            }
        }

        FeedOutcome::Entries { entries, malformed }
    }
}

/// The item's GUID is its permalink; the item links are a fallback for
/// feeds that omit it
fn entry_from_item(item: &feed_rs::model::Entry) -> Result<FeedEntry, FeedError> {
    match parse_permalink(&item.id) {
        Ok(entry) => Ok(entry),
        Err(err) => item
            .links
            .iter()
            .find_map(|link| parse_permalink(&link.href).ok())
            .ok_or(err),
    }
}
