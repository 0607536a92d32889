//! Post-crawl report generation
//!
//! The report is one summarization request sent to the oracle once a run is
//! finalized. It is optional output: any failure yields [`REPORT_FALLBACK`].

use crate::oracle::{OraclePrompt, OracleTransport};
use crate::output::stats::CrawlStatistics;
use crate::state::Node;
use std::sync::Arc;

/// Text returned when no report could be generated
pub const REPORT_FALLBACK: &str = "Report unavailable: the summarization service could not be reached.";

/// Generates a free-text summary of a finished crawl
pub struct ReportGenerator<T> {
    transport: Arc<T>,
}

impl<T> Clone for ReportGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: OracleTransport> ReportGenerator<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Requests a summary of `nodes` using `credential`
    ///
    /// Never fails: a missing credential, a transport fault or an empty reply
    /// all produce [`REPORT_FALLBACK`].
    pub async fn generate(&self, nodes: &[Node], credential: Option<&str>) -> String {
        let Some(credential) = credential else {
            tracing::debug!("No credential available for the report");
            return REPORT_FALLBACK.to_string();
        };

        let stats = CrawlStatistics::from_nodes(nodes, 0);
        let root = nodes.first().map(|n| n.url.as_str()).unwrap_or("unknown");
        let prompt = OraclePrompt::text(report_prompt(root, &stats));

        match self.transport.generate(credential, &prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Report request returned an empty reply");
                REPORT_FALLBACK.to_string()
            }
            Err(fault) => {
                tracing::warn!("Report request failed: {}", fault);
                REPORT_FALLBACK.to_string()
            }
        }
    }
}

fn report_prompt(root: &str, stats: &CrawlStatistics) -> String {
    format!(
        "Write a short plain-text summary of a link crawl of {root}.\n\
         Nodes discovered: {total}\n\
         Nodes scanned: {scanned}\n\
         Resources found: {resources}\n\
         Maximum depth reached: {depth}\n\
         Comment on the site's structure and anything notable about these numbers.",
        root = root,
        total = stats.total_nodes,
        scanned = stats.scanned,
        resources = stats.resources,
        depth = stats.max_depth,
    )
}
