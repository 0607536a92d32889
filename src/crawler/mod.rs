//! Crawler module - the traversal engine
//!
//! This module contains the core crawling logic, including:
//! - The FIFO frontier
//! - The `CrawlSession` step machine and its per-run state
//! - Overall crawl coordination from a loaded configuration

mod coordinator;
mod scheduler;
mod session;

pub use coordinator::{build_session, run_crawl};
pub use scheduler::{Frontier, QueuedNode};
pub use session::{
    CrawlOutcome, CrawlSession, CrawlSettings, RotationEvent, StepOutcome, StopHandle,
};
