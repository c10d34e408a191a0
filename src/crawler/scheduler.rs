//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - The FIFO frontier of (url, depth) entries, which gives breadth-first order
//! - The visited set and its size cap
//! - The same-site admission policy, always judged against the seed

use crate::state::VisitedSet;
use crate::url::same_site;
use std::collections::VecDeque;
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The normalized URL
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,
}

/// Outcome of offering a discovered link to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued and marked visited
    Enqueued,
    /// Not on the seed's site while same-site crawling is on
    OffSite,
    /// Already enqueued earlier in this session
    AlreadyVisited,
    /// The visited set reached its cap
    VisitedCapReached,
}

/// Scheduler owns the frontier queue and the visited set of one session
///
/// Links are marked visited when they are enqueued, not when they are
/// fetched, so two pages linking to the same URL enqueue it only once.
#[derive(Debug)]
pub struct Scheduler {
    seed: Url,
    same_domain_only: bool,
    frontier: VecDeque<FrontierEntry>,
    visited: VisitedSet,
}

impl Scheduler {
    /// Creates a scheduler with the seed enqueued at depth 0
    ///
    /// # Arguments
    ///
    /// * `seed` - The normalized seed URL
    /// * `same_domain_only` - Reject links not on the seed's site
    /// * `visited_cap` - Maximum size of the visited set
    pub fn new(seed: Url, same_domain_only: bool, visited_cap: usize) -> Self {
        let mut visited = VisitedSet::new(visited_cap);
        visited.insert(&seed);

        let mut frontier = VecDeque::new();
        frontier.push_back(FrontierEntry {
            url: seed.clone(),
            depth: 0,
        });

        Self {
            seed,
            same_domain_only,
            frontier,
            visited,
        }
    }

    /// Pops the oldest frontier entry
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        self.frontier.pop_front()
    }

    /// Offers a discovered link for the given depth
    ///
    /// Checks run in order: site scope, visited membership, visited cap.
    pub fn offer(&mut self, url: Url, depth: u32) -> Admission {
        if self.same_domain_only && !same_site(&self.seed, &url) {
            tracing::trace!("Skipping off-site link {}", url);
            return Admission::OffSite;
        }

        if self.visited.contains(&url) {
            return Admission::AlreadyVisited;
        }

        if self.visited.is_full() {
            tracing::trace!(
                "Visited set full ({} URLs), dropping {}",
                self.visited.cap(),
                url
            );
            return Admission::VisitedCapReached;
        }

        self.visited.insert(&url);
        self.frontier.push_back(FrontierEntry { url, depth });
        Admission::Enqueued
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Returns the number of URLs waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }
}
