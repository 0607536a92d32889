//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Recomputing crawl statistics from the node set
//! - Printing statistics at the end of a run
//! - Generating the post-crawl summary report

mod report;
pub mod stats;

pub use report::{ReportGenerator, REPORT_FALLBACK};
pub use stats::{print_statistics, CrawlStatistics};
