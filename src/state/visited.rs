//! Visited-set tracking for a single crawl run
//!
//! The set is owned by the coordinator of one run and borrowed by every unit of
//! work. Checking and inserting happen under one lock acquisition, so two
//! concurrent branches can never both claim the same URL.

use crate::url::visit_key;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Result of trying to claim a URL for fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The URL was not seen before and now belongs to the caller
    New,

    /// The URL was already claimed earlier in this run
    AlreadyVisited,

    /// The set is full; the URL was not recorded
    LimitReached,
}

impl Claim {
    /// Returns true if the caller now owns the URL and should fetch it
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

/// Set of URLs already scheduled for fetching in this run
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,

    /// Maximum number of distinct URLs the set accepts
    limit: Option<usize>,
}

impl VisitedSet {
    /// Creates an unbounded visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a visited set that accepts at most `limit` distinct URLs
    pub fn with_limit(limit: usize) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            limit: Some(limit),
        }
    }

    /// Atomically checks and records a URL
    ///
    /// The URL is keyed without its fragment (see [`visit_key`]).
    pub fn claim(&self, url: &Url) -> Claim {
        self.claim_key(visit_key(url))
    }

    /// Atomically checks and records a pre-computed key
    pub(crate) fn claim_key(&self, key: String) -> Claim {
        let mut seen = self.lock();

        if seen.contains(&key) {
            return Claim::AlreadyVisited;
        }

        if let Some(limit) = self.limit {
            if seen.len() >= limit {
                return Claim::LimitReached;
            }
        }

        seen.insert(key);
        Claim::New
    }

    /// Returns true if the URL has already been claimed
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(&visit_key(url))
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns every claimed key in sorted order
    pub fn snapshot(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().iter().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave the set half-updated
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
