//! Oracle access layer
//!
//! This module contains everything needed to ask the content-discovery
//! oracle for a page's links, including:
//! - The transport seam and its HTTP implementation
//! - Fault classification at the oracle boundary
//! - Prompt construction and reply parsing
//! - The retrying, credential-rotating client

mod client;
mod fault;
mod prompt;
mod transport;

pub use client::{Expansion, OracleClient, RetryPolicy, ATTEMPTS_PER_CREDENTIAL};
pub use fault::{classify_fault, FaultKind, OracleFault};
pub use prompt::{
    candidates_to_nodes, discovery_prompt, parse_candidates, CandidateLink, ExpansionRequest,
    DEFAULT_LABEL,
};
pub use transport::{HttpTransport, OraclePrompt, OracleTransport, DEFAULT_ENDPOINT, DEFAULT_MODEL};
