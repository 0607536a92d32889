use crate::oracle::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;

/// Main configuration structure for Link-Cartographer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub oracle: OracleConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum depth to expand from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of nodes discovered in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Delay before each oracle expansion (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

/// Oracle access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the oracle API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name used for link discovery and reports
    #[serde(default = "default_model")]
    pub model: String,

    /// Access credentials, in rotation order
    #[serde(default)]
    pub credentials: Vec<String>,

    /// Environment variable holding extra comma-separated credentials
    #[serde(rename = "credentials-env")]
    pub credentials_env: Option<String>,

    /// Base retry time unit (milliseconds)
    #[serde(rename = "retry-time-unit-ms", default = "default_retry_time_unit_ms")]
    pub retry_time_unit_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_retry_time_unit_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    60
}
