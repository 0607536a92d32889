use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Credentials named by `credentials-env` are appended to the ones listed in
/// the file before validation.
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
/// use link_cartographer::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;

    if let Some(var) = config.oracle.credentials_env.clone() {
        match std::env::var(&var) {
            Ok(value) => {
                let extra = split_credentials(&value);
                tracing::debug!("Loaded {} credentials from ${}", extra.len(), var);
                config.oracle.credentials.extend(extra);
            }
            Err(_) => tracing::debug!("Credential variable ${} is not set", var),
        }
    }

    validate(&config)?;

    Ok(config)
}

/// Command-line overrides for a loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed_url: Option<String>,
    pub max_depth: Option<u32>,
    pub max_pages: Option<u32>,
}

/// Applies `overrides` to `config` and validates the result
///
/// # Returns
///
/// * `Ok(Config)` - The overridden configuration
/// * `Err(ConfigError)` - An override broke a validation rule
pub fn apply_overrides(mut config: Config, overrides: Overrides) -> Result<Config, ConfigError> {
    if let Some(seed) = overrides.seed_url {
        config.crawler.seed_url = seed;
    }
    if let Some(depth) = overrides.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(pages) = overrides.max_pages {
        config.crawler.max_pages = pages;
    }

    validate(&config)?;

    Ok(config)
}

/// Splits a comma-separated credential list, dropping blanks
fn split_credentials(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
