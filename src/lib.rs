//! Link-Cartographer: an oracle-driven link graph mapper
//!
//! This crate maps the link graph of a site by asking a content-discovery
//! oracle which links exist on each page, assembling the answers into a
//! bounded, deduplicated breadth-first traversal tree.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod oracle;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Link-Cartographer operations
#[derive(Debug, Error)]
pub enum CartographerError {
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// The run started but ended fatally; `outcome` holds the partial results
    #[error("Crawl failed: {source}")]
    Failed {
        outcome: Box<CrawlOutcome>,
        source: CrawlError,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by the oracle client
///
/// Malformed oracle replies never show up here: they are recovered inside the
/// client by treating the page as childless.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle configuration error: {0}")]
    Configuration(String),

    #[error("Quota exhausted on every credential (last: #{credential_index}): {message}")]
    QuotaExceeded {
        credential_index: usize,
        message: String,
    },

    #[error("Oracle fault on credential #{credential_index} ({kind}): {message}")]
    TransientFault {
        credential_index: usize,
        kind: oracle::FaultKind,
        status_code: Option<u16>,
        message: String,
    },
}

impl OracleError {
    /// Index of the credential in use when the error was raised
    pub fn credential_index(&self) -> Option<usize> {
        match self {
            Self::Configuration(_) => None,
            Self::QuotaExceeded {
                credential_index, ..
            }
            | Self::TransientFault {
                credential_index, ..
            } => Some(*credential_index),
        }
    }

    /// Returns true when every credential has been exhausted by quota faults
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Errors raised by the traversal engine
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("No oracle credentials configured")]
    NoCredentials,

    #[error("A crawl is already running")]
    AlreadyRunning,

    #[error("No crawl has been started")]
    NotStarted,

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("Crawl aborted, every oracle credential is exhausted: {0}")]
    CredentialsExhausted(OracleError),
}

/// Result type alias for Link-Cartographer operations
pub type Result<T> = std::result::Result<T, CartographerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for traversal engine operations
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use classify::{classify_content, ContentCategory};
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlSession, StepOutcome};
pub use state::{CredentialPool, NodeStatus, RunStatus};
