use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteEntry, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates remote access configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.request_timeout < 1 || config.request_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be between 1 and 300 seconds, got {}",
            config.request_timeout
        )));
    }

    validate_url_template("feed_url", &config.feed_url)?;
    validate_url_template("ajax_url", &config.ajax_url)?;

    Ok(())
}

/// Checks that a URL template names the site and expands to a valid URL
fn validate_url_template(name: &str, template: &str) -> ConfigResult<()> {
    if !template.contains("{site}") {
        return Err(ConfigError::Validation(format!(
            "{} must contain the {{site}} placeholder, got '{}'",
            name, template
        )));
    }

    let expanded = template
        .replace("{site}", "example")
        .replace("{scheme}", "https");
    Url::parse(&expanded)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, template, e)))?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries
fn validate_sites(sites: &[SiteEntry]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for site in sites {
        validate_site_id(&site.id)?;

        if !seen.insert(site.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Site '{}' is listed more than once",
                site.id
            )));
        }

        for alias in &site.aliases {
            validate_domain_string(alias)?;
        }
    }

    Ok(())
}

/// Site IDs become hostname labels, so they follow hostname rules
fn validate_site_id(id: &str) -> ConfigResult<()> {
    if id.is_empty() {
        return Err(ConfigError::Validation("Site id cannot be empty".to_string()));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Site id '{}' must contain only lowercase letters, digits and hyphens",
            id
        )));
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(ConfigError::Validation(format!(
            "Site id '{}' cannot start or end with '-'",
            id
        )));
    }

    Ok(())
}

/// Validates a domain string
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    if domain.is_empty() {
        return Err(ConfigError::Validation("Alias cannot be empty".to_string()));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Alias '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::Validation(format!(
            "Alias '{}' is not a valid hostname",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
