//! Crawl session - the traversal engine's state and step function
//!
//! A `CrawlSession` owns every piece of per-run state: frontier, visited set,
//! node set, credential cursor, statistics and run flag. The crawl advances
//! one `step()` at a time; `step()` takes `&mut self`, so two steps can never
//! run concurrently and no locking is needed.

use crate::crawler::scheduler::{Frontier, QueuedNode};
use crate::oracle::{ExpansionRequest, FaultKind, OracleClient, OracleTransport, RetryPolicy};
use crate::output::{CrawlStatistics, ReportGenerator};
use crate::state::{CredentialPool, ErrorClass, Node, NodeStatus, RunStatus};
use crate::{CrawlError, CrawlResult, OracleError};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Bounds and pacing of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Nodes at this depth are recorded but never expanded
    pub max_depth: u32,

    /// Maximum number of nodes in the node set
    pub max_pages: usize,

    /// Courtesy delay before each expansion
    pub request_delay: Duration,
}

/// Handle that stops a running crawl from another task
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Clears the run flag; the in-flight step still completes
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// A credential rotation observed after an expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationEvent {
    /// Cursor before the expansion
    pub from: usize,

    /// Cursor after the expansion
    pub to: usize,

    /// Page whose expansion caused the rotation
    pub page_url: String,

    pub at: DateTime<Utc>,
}

/// What a call to `step()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More steps should be scheduled
    Continued,

    /// The run is over with the given status
    Finished(RunStatus),
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub status: RunStatus,
    pub statistics: CrawlStatistics,
    pub report: String,
    pub rotations: Vec<RotationEvent>,
    pub credential_index: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// The traversal engine
pub struct CrawlSession<T> {
    settings: CrawlSettings,
    client: OracleClient<T>,
    reporter: ReportGenerator<T>,

    root_url: String,
    frontier: Frontier,
    visited: HashSet<String>,
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    pool: CredentialPool,
    stats: CrawlStatistics,

    running: Arc<AtomicBool>,
    status: RunStatus,

    scan_order: Vec<String>,
    rotations: Vec<RotationEvent>,
    report: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl<T: OracleTransport> CrawlSession<T> {
    /// Creates an idle session
    ///
    /// # Arguments
    ///
    /// * `settings` - Depth/page budgets and inter-request delay
    /// * `transport` - Oracle transport shared by the client and the report generator
    /// * `policy` - Retry timing for the oracle client
    pub fn new(settings: CrawlSettings, transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self {
            settings,
            client: OracleClient::new(Arc::clone(&transport), policy),
            reporter: ReportGenerator::new(transport),
            root_url: String::new(),
            frontier: Frontier::new(),
            visited: HashSet::new(),
            nodes: Vec::new(),
            node_index: HashMap::new(),
            pool: CredentialPool::default(),
            stats: CrawlStatistics::default(),
            running: Arc::new(AtomicBool::new(false)),
            status: RunStatus::Idle,
            scan_order: Vec::new(),
            rotations: Vec::new(),
            report: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Starts a new run from `seed_url`
    ///
    /// Resets all per-run state, records the seed at depth 0 and enqueues it.
    ///
    /// # Errors
    ///
    /// * `CrawlError::AlreadyRunning` - A run is in progress
    /// * `CrawlError::NoCredentials` - `credentials` is empty
    /// * `CrawlError::InvalidSeed` - The seed is not an http(s) URL
    pub fn start(&mut self, seed_url: &str, credentials: Vec<String>) -> CrawlResult<()> {
        if self.status == RunStatus::Running {
            return Err(CrawlError::AlreadyRunning);
        }

        if credentials.is_empty() {
            return Err(CrawlError::NoCredentials);
        }

        let mut seed = Url::parse(seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidSeed {
                url: seed_url.to_string(),
                reason: format!("unsupported scheme '{}'", seed.scheme()),
            });
        }
        seed.set_fragment(None);
        let seed_url = seed.to_string();

        self.frontier.clear();
        self.visited.clear();
        self.nodes.clear();
        self.node_index.clear();
        self.scan_order.clear();
        self.rotations.clear();
        self.report = None;
        self.finished_at = None;
        self.pool = CredentialPool::new(credentials);

        self.root_url = seed_url.clone();
        self.visited.insert(seed_url.clone());
        self.frontier.push(&seed_url, 0);
        self.node_index.insert(seed_url.clone(), 0);
        self.nodes.push(Node::seed(seed_url));
        self.recompute_statistics();

        self.started_at = Some(Utc::now());
        self.status = RunStatus::Running;
        // Handles from an earlier run must not reach this one
        self.running = Arc::new(AtomicBool::new(true));

        tracing::info!(
            "Crawl started at {} (max depth {}, max pages {}, {} credentials)",
            self.root_url,
            self.settings.max_depth,
            self.settings.max_pages,
            self.pool.len()
        );

        Ok(())
    }

    /// Performs one unit of crawl work
    ///
    /// # Returns
    ///
    /// * `Ok(StepOutcome::Continued)` - A node was processed; call `step()` again
    /// * `Ok(StepOutcome::Finished(status))` - The run is over
    /// * `Err(CrawlError::NotStarted)` - `start()` was never called
    /// * `Err(CrawlError::CredentialsExhausted)` - Every credential hit its quota;
    ///   the run is finalized as `Failed`
    pub async fn step(&mut self) -> CrawlResult<StepOutcome> {
        match self.status {
            RunStatus::Idle => return Err(CrawlError::NotStarted),
            status if status.is_finished() => return Ok(StepOutcome::Finished(status)),
            _ => {}
        }

        if !self.running.load(Ordering::SeqCst) {
            tracing::info!("Stop requested, finalizing run");
            return Ok(StepOutcome::Finished(self.finalize(RunStatus::Aborted).await));
        }

        if self.frontier.is_empty() {
            tracing::info!("Frontier is empty, crawl complete");
            return Ok(StepOutcome::Finished(self.finalize(RunStatus::Completed).await));
        }

        if self.nodes.len() >= self.settings.max_pages {
            tracing::info!("Page budget of {} reached", self.settings.max_pages);
            return Ok(StepOutcome::Finished(self.finalize(RunStatus::Completed).await));
        }

        let Some(queued) = self.frontier.pop() else {
            return Ok(StepOutcome::Continued);
        };

        if queued.depth >= self.settings.max_depth {
            tracing::debug!(
                "{} is at max depth {}, not expanding",
                queued.url,
                self.settings.max_depth
            );
            return Ok(StepOutcome::Continued);
        }

        self.expand_node(queued).await
    }

    /// Drives `step()` until the run finishes
    pub async fn run(&mut self) -> CrawlResult<CrawlOutcome> {
        loop {
            if let StepOutcome::Finished(_) = self.step().await? {
                return Ok(self.outcome());
            }
        }
    }

    /// Clears the run flag; the next step finalizes the run as aborted
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns a handle that can stop this session from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    async fn expand_node(&mut self, queued: QueuedNode) -> CrawlResult<StepOutcome> {
        self.set_status(&queued.url, NodeStatus::Scanning);
        self.scan_order.push(queued.url.clone());

        if !self.settings.request_delay.is_zero() {
            tokio::time::sleep(self.settings.request_delay).await;
        }

        let request = ExpansionRequest {
            page_url: queued.url.clone(),
            root_url: self.root_url.clone(),
            depth: queued.depth,
        };

        let result = self
            .client
            .expand(self.pool.credentials(), self.pool.cursor(), &request)
            .await;

        match result {
            Ok(expansion) => {
                self.advance_cursor(expansion.index_used, &queued.url);

                let offered = expansion.children.len();
                let admitted = self.admit_children(expansion.children);
                tracing::debug!(
                    "Expanded {} (depth {}): {} children, {} new",
                    queued.url,
                    queued.depth,
                    offered,
                    admitted
                );

                if let Some(node) = self.node_mut(&queued.url) {
                    node.status = NodeStatus::Scanned;
                    node.scanned = true;
                }
            }
            Err(error) => {
                if let Some(index) = error.credential_index() {
                    self.advance_cursor(index, &queued.url);
                }

                if error.is_quota_exhausted() {
                    tracing::error!("Expansion of {} failed fatally: {}", queued.url, error);
                    self.set_status(&queued.url, NodeStatus::Error(ErrorClass::RateLimited));
                    self.finalize(RunStatus::Failed).await;
                    return Err(CrawlError::CredentialsExhausted(error));
                }

                tracing::warn!("Expansion of {} failed: {}", queued.url, error);
                self.set_status(&queued.url, NodeStatus::Error(error_class(&error)));
            }
        }

        self.recompute_statistics();

        let expanded = self.scan_order.len();
        if expanded % 10 == 0 {
            tracing::info!(
                "Progress: {} nodes expanded, {} discovered, {} in frontier",
                expanded,
                self.nodes.len(),
                self.frontier.len()
            );
        }

        Ok(StepOutcome::Continued)
    }

    /// Adds unseen children to the node set, enqueueing the expandable ones
    ///
    /// Rediscovered URLs are dropped (first discovery wins). Children beyond
    /// the page budget are not admitted.
    fn admit_children(&mut self, children: Vec<Node>) -> usize {
        let mut admitted = 0;

        for child in children {
            if self.visited.contains(&child.url) {
                tracing::trace!("{} already visited, dropping", child.url);
                continue;
            }

            if self.nodes.len() >= self.settings.max_pages {
                tracing::debug!("Page budget reached, dropping {}", child.url);
                continue;
            }

            self.visited.insert(child.url.clone());
            if child.is_expandable() {
                self.frontier.push(&child.url, child.depth);
            }
            self.node_index.insert(child.url.clone(), self.nodes.len());
            self.nodes.push(child);
            admitted += 1;
        }

        admitted
    }

    fn advance_cursor(&mut self, index: usize, page_url: &str) {
        if let Some(from) = self.pool.advance_to(index) {
            tracing::info!(
                "Rotated oracle credential #{} -> #{} while expanding {}",
                from,
                index,
                page_url
            );
            self.rotations.push(RotationEvent {
                from,
                to: index,
                page_url: page_url.to_string(),
                at: Utc::now(),
            });
        }
    }

    async fn finalize(&mut self, status: RunStatus) -> RunStatus {
        self.running.store(false, Ordering::SeqCst);
        self.status = status;
        self.recompute_statistics();

        // An exhausted pool has nothing left to ask for a report with
        let credential = match status {
            RunStatus::Failed => None,
            _ => self.pool.current(),
        };
        let report = self.reporter.generate(&self.nodes, credential).await;
        self.report = Some(report);
        self.finished_at = Some(Utc::now());

        tracing::info!(
            "Crawl {}: {} nodes discovered, {} scanned, {} errors",
            status,
            self.stats.total_nodes,
            self.stats.scanned,
            self.stats.errors
        );

        status
    }

    fn recompute_statistics(&mut self) {
        self.stats = CrawlStatistics::from_nodes(&self.nodes, self.frontier.len());
    }

    fn node_mut(&mut self, url: &str) -> Option<&mut Node> {
        let index = *self.node_index.get(url)?;
        self.nodes.get_mut(index)
    }

    fn set_status(&mut self, url: &str, status: NodeStatus) {
        if let Some(node) = self.node_mut(url) {
            node.status = status;
        }
    }

    /// Snapshot of the run in its current state
    pub fn outcome(&self) -> CrawlOutcome {
        CrawlOutcome {
            status: self.status,
            statistics: self.stats.clone(),
            report: self.report.clone().unwrap_or_default(),
            rotations: self.rotations.clone(),
            credential_index: self.pool.cursor(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// All discovered nodes, in discovery order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, url: &str) -> Option<&Node> {
        self.node_index.get(url).and_then(|&i| self.nodes.get(i))
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// URLs in the order they were dequeued for expansion
    pub fn scan_order(&self) -> &[String] {
        &self.scan_order
    }

    pub fn rotations(&self) -> &[RotationEvent] {
        &self.rotations
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Index of the active oracle credential
    pub fn credential_index(&self) -> usize {
        self.pool.cursor()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }
}

/// Maps a failed expansion to the error class recorded on the node
fn error_class(error: &OracleError) -> ErrorClass {
    match error {
        OracleError::TransientFault {
            kind: FaultKind::NotFound,
            ..
        } => ErrorClass::NotFound,
        OracleError::TransientFault {
            kind: FaultKind::Forbidden,
            ..
        } => ErrorClass::Forbidden,
        OracleError::QuotaExceeded { .. } => ErrorClass::RateLimited,
        _ => ErrorClass::Server,
    }
}
