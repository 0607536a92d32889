//! Crawler coordinator - wires a configuration into a running crawl
//!
//! This module builds the oracle transport and crawl session from a loaded
//! configuration, maps Ctrl-C to a graceful stop, and drives the session to
//! completion.

use crate::config::Config;
use crate::crawler::session::{CrawlOutcome, CrawlSession, CrawlSettings};
use crate::oracle::{HttpTransport, RetryPolicy};
use crate::CartographerError;
use std::sync::Arc;
use std::time::Duration;

/// Builds an idle crawl session backed by the HTTP oracle transport
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlSession)` - A session ready for `start()`
/// * `Err(CartographerError)` - The HTTP client could not be built
pub fn build_session(config: &Config) -> Result<CrawlSession<HttpTransport>, CartographerError> {
    let transport = HttpTransport::new(
        config.oracle.endpoint.as_str(),
        config.oracle.model.as_str(),
        Duration::from_secs(config.oracle.request_timeout_secs),
    )?;

    let settings = CrawlSettings {
        max_depth: config.crawler.max_depth,
        max_pages: config.crawler.max_pages as usize,
        request_delay: Duration::from_millis(config.crawler.request_delay_ms),
    };

    let policy = RetryPolicy::new(Duration::from_millis(config.oracle.retry_time_unit_ms));

    Ok(CrawlSession::new(settings, Arc::new(transport), policy))
}

/// Runs a complete crawl operation
///
/// This function orchestrates the entire crawl:
///
/// 1. Build the oracle transport and crawl session
/// 2. Start the run from the configured seed
/// 3. Stop gracefully on Ctrl-C (the in-flight step completes)
/// 4. Step until the frontier empties, the budget is hit, or the run is stopped
/// 5. Return the outcome, including the generated report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The run completed or was aborted
/// * `Err(CartographerError::Failed)` - Every credential was exhausted; carries the partial outcome
/// * `Err(CartographerError)` - The run could not start
///
/// # Example
///
/// ```no_run
/// use link_cartographer::config::load_config;
/// use link_cartographer::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("{}", outcome.report);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome, CartographerError> {
    let mut session = build_session(&config)?;
    session.start(&config.crawler.seed_url, config.oracle.credentials.clone())?;

    let stop = session.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current step");
            stop.stop();
        }
    });

    let result = session.run().await;
    interrupt.abort();

    result.map_err(|source| CartographerError::Failed {
        outcome: Box::new(session.outcome()),
        source,
    })
}
