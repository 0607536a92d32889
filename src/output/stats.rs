//! Crawl statistics derived from the node set
//!
//! Statistics are never mutated in place: they are recomputed from the node
//! set after every expansion so they cannot drift from it.

use crate::state::Node;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of nodes discovered (seed included)
    pub total_nodes: u64,

    /// Number of nodes expanded successfully
    pub scanned: u64,

    /// Number of nodes waiting in the frontier
    pub queued: u64,

    /// Nodes whose expansion failed or that the oracle reported broken
    pub errors: u64,

    /// Resource nodes (assets that are never expanded)
    pub resources: u64,

    /// Deepest node discovered
    pub max_depth: u32,

    /// Sum of the synthetic sizes of all nodes
    pub total_size_bytes: u64,
}

impl CrawlStatistics {
    /// Recomputes statistics from the node set
    ///
    /// # Arguments
    ///
    /// * `nodes` - Every node discovered so far
    /// * `queued` - Current frontier length
    pub fn from_nodes(nodes: &[Node], queued: usize) -> Self {
        nodes.iter().fold(
            Self {
                queued: queued as u64,
                ..Self::default()
            },
            |mut stats, node| {
                stats.total_nodes += 1;
                if node.scanned {
                    stats.scanned += 1;
                }
                if node.is_broken() {
                    stats.errors += 1;
                }
                if node.is_resource() {
                    stats.resources += 1;
                }
                stats.max_depth = stats.max_depth.max(node.depth);
                stats.total_size_bytes += node.size_bytes;
                stats
            },
        )
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Nodes discovered: {}", stats.total_nodes);
    println!("  Nodes scanned: {}", stats.scanned);
    println!("  Still queued: {}", stats.queued);
    println!("  Resources: {}", stats.resources);
    println!("  Errors: {}", stats.errors);
    println!("  Max depth: {}", stats.max_depth);
    println!(
        "  Total size: {:.1} KiB",
        stats.total_size_bytes as f64 / 1024.0
    );
    println!();

    let scan_rate = if stats.total_nodes > 0 {
        (stats.scanned as f64 / stats.total_nodes as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Scan Rate: {:.1}% ({} / {} nodes expanded)",
        scan_rate, stats.scanned, stats.total_nodes
    );
}
