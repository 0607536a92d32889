//! Link-Cartographer main entry point
//!
//! This is the command-line interface for the Link-Cartographer link mapper.

use anyhow::Context;
use clap::Parser;
use link_cartographer::config::{apply_overrides, load_config_with_hash, Config, Overrides};
use link_cartographer::crawler::{run_crawl, CrawlOutcome};
use link_cartographer::output::print_statistics;
use link_cartographer::CartographerError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Cartographer: an oracle-driven link graph mapper
///
/// Link-Cartographer asks a content-discovery oracle which links exist on
/// each page of a site and assembles the answers into a bounded,
/// breadth-first traversal tree.
#[derive(Parser, Debug)]
#[command(name = "link-cartographer")]
#[command(version)]
#[command(about = "An oracle-driven link graph mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the seed URL from the configuration
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Override the maximum crawl depth
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_depth: Option<u32>,

    /// Override the maximum number of pages
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let overrides = Overrides {
        seed_url: cli.seed,
        max_depth: cli.max_depth,
        max_pages: cli.max_pages,
    };
    let config = apply_overrides(config, overrides).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_cartographer=info,warn"),
            1 => EnvFilter::new("link_cartographer=debug,info"),
            2 => EnvFilter::new("link_cartographer=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Link-Cartographer Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nOracle:");
    println!("  Endpoint: {}", config.oracle.endpoint);
    println!("  Model: {}", config.oracle.model);
    println!("  Credentials: {}", config.oracle.credentials.len());
    println!("  Retry time unit: {}ms", config.oracle.retry_time_unit_ms);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Mapping {} with {} oracle credentials",
        config.crawler.seed_url,
        config.oracle.credentials.len()
    );

    let outcome = match run_crawl(config).await {
        Ok(outcome) => outcome,
        Err(CartographerError::Failed { outcome, source }) => {
            print_outcome(&outcome);
            return Err(anyhow::Error::new(source).context("crawl failed"));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("crawl failed")),
    };

    print_outcome(&outcome);

    Ok(())
}

/// Prints statistics, rotations and the report of a finished run
fn print_outcome(outcome: &CrawlOutcome) {
    print_statistics(&outcome.statistics);

    if !outcome.rotations.is_empty() {
        println!("\nCredential Rotations ({}):", outcome.rotations.len());
        for rotation in &outcome.rotations {
            println!(
                "  - #{} -> #{} at {} ({})",
                rotation.from,
                rotation.to,
                rotation.at.format("%H:%M:%S"),
                rotation.page_url
            );
        }
    }

    println!("\nRun status: {}", outcome.status);
    println!("\n=== Report ===\n\n{}", outcome.report);
}
