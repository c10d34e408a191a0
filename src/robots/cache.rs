//! Per-origin robots.txt cache
//!
//! A session fetches robots.txt at most once per origin; the entry then lives
//! as long as the session does.

use crate::robots::ParsedRobots;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, robots_url: &str) -> Option<&ParsedRobots> {
        self.entries.get(robots_url)
    }

    pub fn contains(&self, robots_url: &str) -> bool {
        self.entries.contains_key(robots_url)
    }

    pub fn insert(&mut self, robots_url: impl Into<String>, robots: ParsedRobots) {
        self.entries.insert(robots_url.into(), robots);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
