//! Crawl frontier: the visited set and the FIFO queue of URLs still to fetch
//!
//! The frontier is owned by the coordinator alone. Workers hand their discovered links
//! back and the coordinator merges them here, so deduplication has a single writer.

use std::collections::{HashSet, VecDeque};

/// Visited set plus pending FIFO queue driving breadth-first traversal
///
/// Every URL ever offered is remembered, so a URL is dispatched at most once per run
/// even if it fails and is discovered again later.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs fetched successfully, in the order they were marked
    visited_order: Vec<String>,

    /// Membership index for `visited_order`
    visited: HashSet<String>,

    /// URLs waiting to be dispatched, oldest first
    pending: VecDeque<String>,

    /// Every URL that has ever been queued (pending, dispatched or visited)
    seen: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: &str) -> Self {
        let mut frontier = Self::default();
        frontier.offer([seed.to_string()]);
        frontier
    }

    /// Removes up to `max` URLs from the front of the queue
    pub fn next_batch(&mut self, max: usize) -> Vec<String> {
        let take = max.min(self.pending.len());
        self.pending.drain(..take).collect()
    }

    /// Queues links not already visited, pending or dispatched
    ///
    /// Duplicates within `links` are queued once, at their first position.
    ///
    /// # Returns
    ///
    /// The number of links actually queued
    pub fn offer<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for link in links {
            if self.seen.contains(&link) {
                continue;
            }
            self.seen.insert(link.clone());
            self.pending.push_back(link);
            added += 1;
        }
        added
    }

    /// Records a successful fetch
    ///
    /// # Returns
    ///
    /// `true` if the URL was not already visited
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.visited_order.push(url.to_string());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if the URL was ever queued or visited
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Visited URLs in the order they were recorded
    pub fn visited(&self) -> &[String] {
        &self.visited_order
    }

    pub fn visited_len(&self) -> usize {
        self.visited_order.len()
    }

    /// URLs still waiting, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is left to dispatch
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
