//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher behind a small type that
//! also represents the allow-all and disallow-all fallbacks.

use robotstxt::DefaultMatcher;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    AllowAll,
    DisallowAll,
    Content(String),
}

/// Parsed robots.txt data
///
/// The raw content is kept and matched on demand, since the robotstxt
/// matcher works directly on the file text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ParsedRobots that denies everything
    ///
    /// Used when the server answers robots.txt with 401 or 403.
    pub fn disallow_all() -> Self {
        Self {
            rules: Rules::DisallowAll,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL (or path) to check
    /// * `user_agent` - The product token to match against `User-agent` lines
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed, or the matcher failed internally
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let content = match &self.rules {
            Rules::AllowAll => return true,
            Rules::DisallowAll => return false,
            Rules::Content(content) if content.trim().is_empty() => return true,
            Rules::Content(content) => content,
        };

        // robotstxt can panic on some malformed input; treat that as allowed.
        panic::catch_unwind(AssertUnwindSafe(|| {
            let mut matcher = DefaultMatcher::default();
            matcher.one_agent_allowed_by_robots(content, user_agent, url)
        }))
        .unwrap_or_else(|_| {
            tracing::warn!("robots.txt matcher failed for {}, allowing fetch", url);
            true
        })
    }
}
