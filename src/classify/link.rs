/// Link tags proposed by the oracle for each discovered candidate
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship of a discovered link to the crawl root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Page on the same site as the root
    #[default]
    Internal,
    /// Page on another site - recorded, never expanded
    External,
    /// Asset such as an image or stylesheet - recorded, never expanded
    Resource,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a link was found on its parent page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryChannel {
    /// The crawl root
    Seed,
    #[default]
    Anchor,
    ImgSrc,
    ScriptSrc,
    ApiCall,
    /// Any tag the oracle invents that we do not know
    #[serde(other)]
    Other,
}

impl DiscoveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Anchor => "anchor",
            Self::ImgSrc => "img_src",
            Self::ScriptSrc => "script_src",
            Self::ApiCall => "api_call",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DiscoveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
