//! Fault classification at the oracle boundary
//!
//! The oracle reports failures in several shapes: a numeric status code, a
//! named status such as `RESOURCE_EXHAUSTED`, or only a message. Everything
//! past this module works with [`FaultKind`].

use std::fmt;

/// Raw failure as reported by an oracle transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleFault {
    /// Numeric status (HTTP status or the error body's `code`)
    pub status_code: Option<u16>,

    /// Named status, e.g. `RESOURCE_EXHAUSTED`
    pub status: Option<String>,

    /// Free-form message
    pub message: String,
}

impl OracleFault {
    pub fn new(status_code: Option<u16>, status: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status,
            message: message.into(),
        }
    }

    /// A fault with only a numeric status
    pub fn with_code(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(Some(status_code), None, message)
    }

    /// A fault with no status at all (connection errors and the like)
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

impl fmt::Display for OracleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status_code, &self.status) {
            (Some(code), Some(status)) => write!(f, "{} {}: {}", code, status, self.message),
            (Some(code), None) => write!(f, "{}: {}", code, self.message),
            (None, Some(status)) => write!(f, "{}: {}", status, self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Typed fault categories used by the client and the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Rate limit or quota exhaustion - rotate credentials
    Quota,
    /// The page does not exist
    NotFound,
    /// The page is not accessible
    Forbidden,
    /// Any other server or network fault - retry in place
    Transient,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quota => "quota",
            Self::NotFound => "not-found",
            Self::Forbidden => "forbidden",
            Self::Transient => "transient",
        };
        write!(f, "{}", name)
    }
}

const QUOTA_STATUS_CODE: u16 = 429;
const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";
const QUOTA_MARKERS: &[&str] = &["quota", "rate limit", "rate-limit", "resource exhausted", "resource_exhausted"];

/// Maps a raw oracle fault to a [`FaultKind`]
///
/// The three quota signals (status 429, a `RESOURCE_EXHAUSTED` status, or a
/// quota-related message) are treated as equivalent and take precedence over
/// any other classification.
pub fn classify_fault(fault: &OracleFault) -> FaultKind {
    if is_quota_fault(fault) {
        return FaultKind::Quota;
    }

    match fault.status_code {
        Some(404) => FaultKind::NotFound,
        Some(403) => FaultKind::Forbidden,
        _ => FaultKind::Transient,
    }
}

fn is_quota_fault(fault: &OracleFault) -> bool {
    if fault.status_code == Some(QUOTA_STATUS_CODE) {
        return true;
    }

    if fault
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case(QUOTA_STATUS))
    {
        return true;
    }

    let message = fault.message.to_ascii_lowercase();
    QUOTA_MARKERS.iter().any(|marker| message.contains(marker))
}
