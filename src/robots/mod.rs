//! Robots.txt handling module
//!
//! This module fetches, parses and caches robots.txt files and answers
//! fetch-permission queries for the crawler. Every failure along the way
//! fails open: an unreachable or broken robots.txt never blocks a crawl.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::crawler::{decode_body, Fetcher};
use crate::url::robots_url;
use url::Url;

/// Largest robots.txt body read, matching the 500 KiB limit common crawlers apply
const ROBOTS_BODY_LIMIT: usize = 500 * 1024;

/// Fetches and parses robots.txt at the given URL
///
/// | Response | Result |
/// |----------|--------|
/// | 2xx | parsed content |
/// | 401, 403 | disallow all |
/// | any other status | allow all |
/// | network or TLS failure | allow all |
pub async fn fetch_robots(fetcher: &Fetcher, robots_url: &Url) -> ParsedRobots {
    match fetcher.fetch_body(robots_url, ROBOTS_BODY_LIMIT).await {
        Ok(body) if (200..300).contains(&body.status) => {
            let content = decode_body(&body.bytes, body.charset.as_deref());
            tracing::debug!("Fetched robots.txt from {} ({} bytes)", robots_url, body.bytes.len());
            ParsedRobots::from_content(&content)
        }
        Ok(body) if body.status == 401 || body.status == 403 => {
            tracing::info!(
                "robots.txt at {} answered {}, treating site as disallowed",
                robots_url,
                body.status
            );
            ParsedRobots::disallow_all()
        }
        Ok(body) => {
            tracing::debug!(
                "robots.txt at {} answered {}, allowing all",
                robots_url,
                body.status
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Extracts the product token robots.txt groups are matched against
///
/// `LinkProbe/1.0 (+https://example.invalid/bot)` becomes `LinkProbe`.
pub fn agent_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or("*")
        .to_string()
}

/// Answers robots.txt permission queries for one crawl session
#[derive(Debug)]
pub struct RobotsGate {
    agent: String,
    cache: RobotsCache,
}

impl RobotsGate {
    /// Creates a gate for the given User-Agent header value
    pub fn new(user_agent: &str) -> Self {
        Self {
            agent: agent_token(user_agent),
            cache: RobotsCache::new(),
        }
    }

    /// Product token used for matching
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Returns whether `url` may be fetched
    ///
    /// The robots.txt for the URL's origin is fetched on first use and cached
    /// for the rest of the session.
    pub async fn can_fetch(&mut self, fetcher: &Fetcher, url: &Url) -> bool {
        let Some(robots) = robots_url(url) else {
            return true;
        };

        if !self.cache.contains(robots.as_str()) {
            let parsed = fetch_robots(fetcher, &robots).await;
            self.cache.insert(robots.as_str(), parsed);
        }

        self.cache
            .get(robots.as_str())
            .map_or(true, |parsed| parsed.is_allowed(url.as_str(), &self.agent))
    }

    /// Number of origins whose robots.txt has been loaded
    pub fn origins_loaded(&self) -> usize {
        self.cache.len()
    }
}
