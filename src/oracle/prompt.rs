//! Oracle prompt construction and reply parsing
//!
//! Replies are expected to be a single JSON array of link descriptors. Any
//! reply that cannot be read as such is a soft failure: the page is treated
//! as childless.

use crate::classify::{classify_content, DiscoveryChannel, LinkKind};
use crate::state::{Node, NodeStatus};
use rand::Rng;
use serde::Deserialize;
use url::Url;

/// Label used when the oracle does not name a link
pub const DEFAULT_LABEL: &str = "Untitled";

/// Inputs of one expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRequest {
    /// Page whose links are requested
    pub page_url: String,

    /// Root of the crawl, giving the oracle its site context
    pub root_url: String,

    /// Depth of the page being expanded
    pub depth: u32,
}

/// One link descriptor as returned by the oracle
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateLink {
    pub url: Option<String>,
    #[serde(alias = "title", alias = "text")]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "kind", alias = "classification")]
    pub kind: Option<String>,
    pub status: Option<serde_json::Value>,
    #[serde(alias = "discoveredVia", alias = "channel", alias = "source")]
    pub discovery: Option<DiscoveryChannel>,
}

/// Builds the link-discovery prompt for one page
pub fn discovery_prompt(request: &ExpansionRequest) -> String {
    format!(
        "You are a web crawler exploring the site rooted at {root}.\n\
         The current page is {page} at crawl depth {depth}.\n\
         List between 4 and 8 plausible links that this page would contain.\n\
         Respond with a single JSON array and nothing else. Each element must be an object with:\n\
         - \"url\": the absolute URL of the link\n\
         - \"label\": the visible link text or asset name\n\
         - \"type\": one of \"internal\", \"external\", \"resource\"\n\
         - \"status\": the expected HTTP status code as a number\n\
         - \"discovery\": one of \"anchor\", \"img_src\", \"script_src\", \"api_call\"",
        root = request.root_url,
        page = request.page_url,
        depth = request.depth,
    )
}

/// Parses an oracle reply into candidate links
///
/// Returns `None` when the reply is not a JSON array of objects. Markdown code
/// fences and text around the array are tolerated.
pub fn parse_candidates(payload: &str) -> Option<Vec<CandidateLink>> {
    let start = payload.find('[')?;
    let end = payload.rfind(']')?;
    if end < start {
        return None;
    }

    serde_json::from_str(&payload[start..=end]).ok()
}

/// Normalizes candidate links into child nodes of `request.page_url`
///
/// Candidates without a resolvable URL are dropped. The content category is
/// always recomputed from the URL, never taken from the oracle.
pub fn candidates_to_nodes(candidates: Vec<CandidateLink>, request: &ExpansionRequest) -> Vec<Node> {
    let base = Url::parse(&request.page_url).ok();
    let mut rng = rand::rng();

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let raw_url = candidate.url.as_deref()?.trim();
            if raw_url.is_empty() {
                return None;
            }

            let url = match resolve_url(base.as_ref(), raw_url) {
                Some(url) => url,
                None => {
                    tracing::debug!("Dropping unresolvable candidate URL {}", raw_url);
                    return None;
                }
            };

            let category = classify_content(&url);
            let (size_range, latency_range) = if category.is_html() {
                (2_000..80_000, 80..900)
            } else {
                (300..400_000, 20..400)
            };

            Some(Node {
                label: candidate
                    .label
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
                depth: request.depth + 1,
                parent: Some(request.page_url.clone()),
                kind: parse_kind(candidate.kind.as_deref()),
                category,
                status: NodeStatus::Pending,
                channel: candidate.discovery.unwrap_or_default(),
                reported_status: parse_status_hint(candidate.status.as_ref()),
                size_bytes: rng.random_range(size_range),
                latency_ms: rng.random_range(latency_range),
                scanned: false,
                url,
            })
        })
        .collect()
}

/// Resolves a candidate against its page, keeping only http(s) URLs
///
/// The fragment is dropped so `/a` and `/a#top` share one identity.
fn resolve_url(base: Option<&Url>, raw: &str) -> Option<String> {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok()?,
        Err(_) => return None,
    };

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}

fn parse_kind(tag: Option<&str>) -> LinkKind {
    match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("external") => LinkKind::External,
        Some("resource") => LinkKind::Resource,
        _ => LinkKind::Internal,
    }
}

fn parse_status_hint(value: Option<&serde_json::Value>) -> u16 {
    match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .unwrap_or(200),
        Some(serde_json::Value::String(s)) => s
            .split_whitespace()
            .next()
            .and_then(|code| code.parse().ok())
            .unwrap_or(200),
        _ => 200,
    }
}
