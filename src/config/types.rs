use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// User agent sent with every request unless the config overrides it
pub const DEFAULT_USER_AGENT: &str = "LinkProbe/1.0 (+https://example.invalid/bot)";

/// Main configuration structure for linkprobe
///
/// Every section is optional in the TOML file; missing keys take the defaults
/// documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub robots: RobotsConfig,
    pub output: OutputConfig,
    pub check: CheckConfig,
}

/// Traversal limits and politeness
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link distance from the seed (0 = seed page only)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages actually fetched (robots-blocked pages excluded)
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Pause after every real fetch, in seconds
    pub delay: f64,

    /// Only follow links sharing scheme, host and port with the seed
    #[serde(rename = "same-domain-only")]
    pub same_domain_only: bool,

    /// Visited-set cap as a multiple of `max_pages`
    #[serde(rename = "visited-multiplier")]
    pub visited_multiplier: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            max_pages: 500,
            delay: 0.0,
            same_domain_only: true,
            visited_multiplier: 5,
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay)
    }

    /// Upper bound on the number of URLs the visited set may hold
    pub fn visited_cap(&self) -> usize {
        self.max_pages.saturating_mul(self.visited_multiplier)
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout: f64,

    /// Verify TLS certificates
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,

    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 10.0,
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// robots.txt compliance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub respect: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self { respect: true }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the timestamped report is written to
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Batch URL-list checking
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Only check URLs on this domain or its subdomains
    #[serde(rename = "allowed-domain")]
    pub allowed_domain: Option<String>,
}
