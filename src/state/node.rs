use crate::classify::{classify_content, ContentCategory, DiscoveryChannel, LinkKind};
use crate::state::NodeStatus;

/// One discovered URL in the traversal tree
///
/// The URL is the node's identity: a crawl never holds two nodes with the
/// same URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Absolute URL of the page or resource
    pub url: String,

    /// Human-readable label reported by the oracle
    pub label: String,

    /// Distance from the seed
    pub depth: u32,

    /// URL of the node that discovered this one (None for the seed)
    pub parent: Option<String>,

    /// Relationship to the crawl root
    pub kind: LinkKind,

    /// Content category, always derived from the URL
    pub category: ContentCategory,

    /// Lifecycle status
    pub status: NodeStatus,

    /// How the link was found on its parent
    pub channel: DiscoveryChannel,

    /// HTTP-like status hint reported by the oracle
    pub reported_status: u16,

    /// Synthetic payload size in bytes
    pub size_bytes: u64,

    /// Synthetic response latency in milliseconds
    pub latency_ms: u64,

    /// Whether the node has been expanded successfully
    pub scanned: bool,
}

impl Node {
    /// Creates the root node of a crawl
    pub fn seed(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            category: classify_content(&url),
            label: "Root".to_string(),
            url,
            depth: 0,
            parent: None,
            kind: LinkKind::Internal,
            status: NodeStatus::Pending,
            channel: DiscoveryChannel::Seed,
            reported_status: 200,
            size_bytes: 0,
            latency_ms: 0,
            scanned: false,
        }
    }

    /// Returns true if this node may enter the frontier
    ///
    /// Only internal HTML pages are expanded; resources and external pages
    /// are leaves.
    pub fn is_expandable(&self) -> bool {
        self.kind == LinkKind::Internal && self.category.is_html()
    }

    /// Returns true if this node counts as a resource in the statistics
    pub fn is_resource(&self) -> bool {
        self.kind == LinkKind::Resource || self.category.is_resource()
    }

    /// Returns true if the node failed or was reported broken by the oracle
    pub fn is_broken(&self) -> bool {
        self.status.is_error() || self.reported_status >= 400
    }
}
