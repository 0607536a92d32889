//! Node lifecycle and run status definitions
//!
//! This module defines the states a node moves through during a crawl, and
//! the overall status of a crawl run.

use std::fmt;

/// Failure class recorded on a node whose expansion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The oracle reported the page as missing
    NotFound,
    /// The oracle reported the page as forbidden
    Forbidden,
    /// Every credential hit its quota while expanding this node
    RateLimited,
    /// Any other server or network fault
    Server,
}

impl ErrorClass {
    /// HTTP-like status code used in the `error-<code>` label
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::RateLimited => 429,
            Self::Server => 500,
        }
    }
}

/// Represents the current lifecycle state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    // ===== Active States =====
    /// Node has been discovered and not yet expanded
    Pending,

    /// Node is currently being expanded by the oracle
    Scanning,

    // ===== Terminal States =====
    /// Node was expanded successfully
    Scanned,

    /// Node expansion failed
    Error(ErrorClass),
}

impl NodeStatus {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Scanning)
    }

    /// Returns true if this represents a successful expansion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Scanned)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the status label, e.g. `pending` or `error-404`
    pub fn label(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::Scanning => "scanning".to_string(),
            Self::Scanned => "scanned".to_string(),
            Self::Error(class) => format!("error-{}", class.code()),
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Overall status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunStatus {
    /// No crawl has been started yet
    #[default]
    Idle,
    /// Steps are being scheduled
    Running,
    /// The frontier emptied or the page budget was reached
    Completed,
    /// `stop()` was called before the crawl finished
    Aborted,
    /// Every oracle credential was exhausted
    Failed,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
