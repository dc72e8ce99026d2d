use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use forumwatch::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Watching {} sites", config.sites.len());
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded with every run so a change of configuration between runs is visible.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration and returns both the config and its hash
///
/// The file is read once, so the hash always describes the parsed content.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
