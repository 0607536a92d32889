//! State module for tracking crawl progress
//!
//! This module provides the per-node and per-run state used by the traversal
//! engine.
//!
//! # Components
//!
//! - `Node`: One discovered URL with its classification, depth and status
//! - `NodeStatus`: Node lifecycle (pending, scanning, scanned, error-<code>)
//! - `RunStatus`: Overall status of a crawl run
//! - `CredentialPool`: Oracle credentials with a forward-only cursor

mod credential_pool;
mod node;
mod node_status;

// Re-export main types
pub use credential_pool::CredentialPool;
pub use node::Node;
pub use node_status::{ErrorClass, NodeStatus, RunStatus};
