/// Page result definitions for recording crawl outcomes
///
/// Every frontier pop, and every row of a batch check, produces exactly one
/// `PageResult`.
use std::fmt;

/// Error text recorded for URLs that robots.txt disallows
pub const ROBOTS_BLOCKED: &str = "Blocked by robots.txt";

/// Maximum number of characters kept from a page title
const TITLE_MAX_CHARS: usize = 200;

/// Outcome of one fetch attempt
///
/// `status` is `None` exactly when `error` is `Some`. The robots-blocked
/// record follows the same rule, with `elapsed_ms` also left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// The requested, normalized URL
    pub url: String,

    /// URL of the last response after following redirects
    pub final_url: String,

    /// HTTP status of the final response
    pub status: Option<u16>,

    /// True iff the status is in [200, 400)
    pub ok: bool,

    /// Classified failure message
    pub error: Option<String>,

    /// Wall time spent on the request
    pub elapsed_ms: Option<u64>,

    /// Content-Type header of the final response
    pub content_type: Option<String>,

    /// Whether any redirect was followed
    pub redirected: bool,

    /// Requested URL, every intermediate hop, and the final URL; empty when not redirected
    pub redirect_chain: Vec<String>,

    /// Link distance from the seed
    pub depth: u32,

    /// Page title, truncated
    pub title: Option<String>,
}

impl PageResult {
    /// Builds the record for a response that arrived
    pub fn response(
        url: impl Into<String>,
        final_url: impl Into<String>,
        status: u16,
        elapsed_ms: u64,
        content_type: Option<String>,
        redirect_chain: Vec<String>,
    ) -> Self {
        let url = url.into();
        let final_url = final_url.into();
        let redirected = final_url != url || !redirect_chain.is_empty();

        Self {
            url,
            final_url,
            status: Some(status),
            ok: (200..400).contains(&status),
            error: None,
            elapsed_ms: Some(elapsed_ms),
            content_type: content_type.filter(|ct| !ct.is_empty()),
            redirected,
            redirect_chain,
            depth: 0,
            title: None,
        }
    }

    /// Builds the record for a request that produced no response
    pub fn failure(url: impl Into<String>, error: impl Into<String>, elapsed_ms: Option<u64>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: None,
            ok: false,
            error: Some(error.into()),
            elapsed_ms,
            content_type: None,
            redirected: false,
            redirect_chain: Vec::new(),
            depth: 0,
            title: None,
        }
    }

    /// Builds the record for a URL that robots.txt disallows
    pub fn robots_blocked(url: impl Into<String>, depth: u32) -> Self {
        Self::failure(url, ROBOTS_BLOCKED, None).with_depth(depth)
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the title, trimmed and truncated; blank titles are ignored
    pub fn set_title(&mut self, title: &str) {
        let title = title.trim();
        if !title.is_empty() {
            self.title = Some(title.chars().take(TITLE_MAX_CHARS).collect());
        }
    }

    pub fn is_robots_blocked(&self) -> bool {
        self.status.is_none() && self.error.as_deref() == Some(ROBOTS_BLOCKED)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }

    /// True when the response declares an HTML body
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }

    /// Redirect chain as written to the report
    pub fn redirect_chain_display(&self) -> String {
        if self.redirected {
            self.redirect_chain.join(" -> ")
        } else {
            String::new()
        }
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "None".to_string());
        let error = self.error.as_deref().unwrap_or("None");
        write!(f, "{} | status={} | error={}", self.url, status, error)
    }
}
