//! Frontier management for the breadth-first crawl
//!
//! The frontier is a strict FIFO queue. Children are always enqueued with
//! depth = parent + 1, so every node at depth d leaves the queue before any
//! node at depth d + 1.

use std::collections::{HashSet, VecDeque};

/// A node waiting for expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedNode {
    /// The node's URL (its identity in the node set)
    pub url: String,

    /// Distance from the seed
    pub depth: u32,
}

/// FIFO frontier of nodes awaiting expansion
///
/// A URL enters the frontier at most once per run, even after it has been
/// dequeued.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Nodes in arrival order
    queue: VecDeque<QueuedNode>,

    /// Every URL ever enqueued in this run
    enqueued: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to the back of the queue
    ///
    /// # Returns
    ///
    /// * `true` - The node was enqueued
    /// * `false` - The URL had already been enqueued during this run
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        if !self.enqueued.insert(url.to_string()) {
            tracing::trace!("{} already enqueued, skipping", url);
            return false;
        }

        self.queue.push_back(QueuedNode {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Removes and returns the head of the queue
    pub fn pop(&mut self) -> Option<QueuedNode> {
        self.queue.pop_front()
    }

    /// Returns the number of nodes in the frontier
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops all queued nodes and forgets enqueue history
    pub fn clear(&mut self) {
        self.queue.clear();
        self.enqueued.clear();
    }
}
