//! Classification module for discovered links
//!
//! This module provides the content-type classifier that decides whether a URL
//! points at an expandable HTML page or a leaf resource, along with the
//! link classification and discovery-channel tags reported by the oracle.

mod link;

pub use link::{DiscoveryChannel, LinkKind};

use std::fmt;

/// Coarse content category derived from a URL suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    /// An HTML page (the default when no known suffix matches)
    Html,
    /// Raster or vector image
    Image,
    /// JavaScript source
    Script,
    /// CSS style sheet
    Style,
    /// PDF document
    Pdf,
    /// JSON document
    Json,
}

impl ContentCategory {
    /// Returns true if pages of this category can be expanded by the oracle
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html)
    }

    /// Returns true if this category is a leaf resource
    pub fn is_resource(&self) -> bool {
        !self.is_html()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Image => "image",
            Self::Script => "script",
            Self::Style => "style",
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Suffix table, checked in order
const SUFFIXES: &[(&[&str], ContentCategory)] = &[
    (
        &[
            ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".bmp", ".avif",
        ],
        ContentCategory::Image,
    ),
    (&[".js", ".mjs"], ContentCategory::Script),
    (&[".css"], ContentCategory::Style),
    (&[".pdf"], ContentCategory::Pdf),
    (&[".json"], ContentCategory::Json),
];

/// Classifies a URL into a content category by its suffix
///
/// Matching is case-insensitive and ignores any query string or fragment.
/// URLs without a recognised suffix are treated as HTML pages.
///
/// # Examples
///
/// ```
/// use link_cartographer::classify::{classify_content, ContentCategory};
///
/// assert_eq!(classify_content("https://example.test/a/style.CSS"), ContentCategory::Style);
/// assert_eq!(classify_content("https://example.test/about"), ContentCategory::Html);
/// ```
pub fn classify_content(url: &str) -> ContentCategory {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].to_ascii_lowercase();

    SUFFIXES
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|s| path.ends_with(s)))
        .map(|(_, category)| *category)
        .unwrap_or(ContentCategory::Html)
}
