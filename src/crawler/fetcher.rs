//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and TLS policy
//! - HEAD requests with a single GET retry on network-class failures
//! - Manual redirect following so the redirect chain can be reported
//! - Bounded body reads for titles, link extraction and robots.txt
//! - Error classification into a fixed taxonomy

use crate::config::HttpConfig;
use crate::crawler::parser::extract_title;
use crate::state::PageResult;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Method, Response};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Body bytes read from a page while crawling
pub const CRAWL_BODY_LIMIT: usize = 512 * 1024;

/// Body bytes read from a page during a single, non-traversal check
pub const CHECK_BODY_LIMIT: usize = 128 * 1024;

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Classified reason a request produced no response
///
/// The `Display` output is what lands in `PageResult::error`; each variant has
/// a stable prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("SSL error: {0}")]
    Tls(String),

    #[error("Connection timeout")]
    ConnectTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Error: {0}")]
    Other(String),
}

impl FetchFailure {
    /// Maps a reqwest error onto the failure taxonomy
    ///
    /// | Condition | Failure |
    /// |-----------|---------|
    /// | timeout while connecting | ConnectTimeout |
    /// | any other timeout | ReadTimeout |
    /// | connect error caused by TLS | Tls |
    /// | other connect error | Connection |
    /// | anything else | Other |
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::ReadTimeout
            };
        }

        let causes = source_chain(err);
        let detail = if causes.is_empty() {
            err.to_string()
        } else {
            format!("{}: {}", err, causes.join(": "))
        };

        if err.is_connect() {
            if causes.iter().any(|cause| looks_like_tls(cause)) {
                Self::Tls(detail)
            } else {
                Self::Connection(detail)
            }
        } else {
            Self::Other(detail)
        }
    }
}

/// Messages of every error below the top-level one
///
/// The top-level message embeds the request URL, so it is kept out of the
/// TLS heuristic.
fn source_chain(err: &reqwest::Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

fn looks_like_tls(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Why a single request attempt (including its redirects) failed
#[derive(Debug)]
enum AttemptError {
    Request(reqwest::Error),
    TooManyRedirects(String),
}

impl AttemptError {
    /// Network-class failures are worth one retry with GET
    fn is_network(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::TooManyRedirects(_) => false,
        }
    }

    fn into_failure(self) -> FetchFailure {
        match self {
            Self::Request(e) => FetchFailure::classify(&e),
            Self::TooManyRedirects(message) => FetchFailure::Other(message),
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(e) => write!(f, "{}", e),
            Self::TooManyRedirects(message) => write!(f, "{}", message),
        }
    }
}

/// Final response of a request after its redirects were followed
struct Followed {
    response: Response,
    final_url: Url,
    /// Every URL visited, starting with the requested one; empty without redirects
    chain: Vec<String>,
}

/// A bounded GET body with its response metadata
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Charset declared in the Content-Type header
    pub charset: Option<String>,
    /// Body prefix, at most the requested limit
    pub bytes: Vec<u8>,
}

/// A checked page and the HTML body read while checking it
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The recorded outcome
    pub result: PageResult,
    /// Body prefix of an HTML answer, when one was read
    pub body: Option<FetchedBody>,
}

impl FetchOutcome {
    fn without_body(result: PageResult) -> Self {
        Self { result, body: None }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled at the client level; the fetcher follows them
/// itself to record each hop.
///
/// # Example
///
/// ```no_run
/// use linkprobe::config::HttpConfig;
/// use linkprobe::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.timeout())
        .redirect(Policy::none())
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Extracts the `charset` parameter from a Content-Type value
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

fn header_content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|ct| !ct.is_empty())
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

fn redirect_target(current: &Url, response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    let next = current.join(location.trim()).ok()?;
    matches!(next.scheme(), "http" | "https").then_some(next)
}

/// Reads at most `limit` bytes of a response body
async fn read_prefix(mut response: Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut buf = Vec::new();
    while buf.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = (limit - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(buf)
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Performs single page retrievals for a session
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Builds a fetcher and its HTTP client from configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config.timeout()))
    }

    /// Wraps an existing client; it must not follow redirects itself
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks a URL and records the outcome
    ///
    /// Same as [`Fetcher::fetch_page`] without the body.
    pub async fn fetch(&self, url: &Url, body_limit: usize) -> PageResult {
        self.fetch_page(url, body_limit).await.result
    }

    /// Checks a URL, keeping any HTML body read along the way
    ///
    /// # Request Flow
    ///
    /// 1. HEAD, following redirects
    /// 2. On a network-class failure, one GET retry with the same timeout
    /// 3. If the GET fails too, the failure is classified and recorded
    /// 4. For an HTML answer, up to `body_limit` bytes are read to extract the
    ///    title: from the GET retry itself, or from a separate GET of the final
    ///    URL when HEAD answered with a 2xx status
    ///
    /// HTTP error statuses are responses, not failures: they are returned with
    /// their status and no retry. The returned result has depth 0.
    pub async fn fetch_page(&self, url: &Url, body_limit: usize) -> FetchOutcome {
        let started = Instant::now();

        let (followed, attempt_started, used_get) = match self.send_following(Method::HEAD, url).await {
            Ok(followed) => (followed, started, false),
            Err(err) if err.is_network() => {
                tracing::debug!("HEAD {} failed ({}), retrying with GET", url, err);
                let retry_started = Instant::now();
                match self.send_following(Method::GET, url).await {
                    Ok(followed) => (followed, retry_started, true),
                    Err(err) => return FetchOutcome::without_body(Self::failed(url, err, started)),
                }
            }
            Err(err) => return FetchOutcome::without_body(Self::failed(url, err, started)),
        };

        let elapsed = elapsed_ms(attempt_started);
        let Followed {
            response,
            final_url,
            chain,
        } = followed;
        let status = response.status().as_u16();
        let content_type = header_content_type(&response);
        let mut result = PageResult::response(
            url.as_str(),
            final_url.as_str(),
            status,
            elapsed,
            content_type.clone(),
            chain,
        );

        let body = if !is_html(content_type.as_deref()) {
            None
        } else if used_get {
            let charset = content_type.as_deref().and_then(charset_from_content_type);
            match read_prefix(response, body_limit).await {
                Ok(bytes) => Some(FetchedBody {
                    final_url,
                    status,
                    content_type,
                    charset,
                    bytes,
                }),
                Err(e) => {
                    tracing::debug!("Could not read body of {}: {}", url, e);
                    None
                }
            }
        } else if result.is_success() {
            match self.fetch_body(&final_url, body_limit).await {
                Ok(body) if (200..300).contains(&body.status) && is_html(body.content_type.as_deref()) => {
                    Some(body)
                }
                Ok(body) => {
                    tracing::debug!("GET {} answered {}, no title read", final_url, body.status);
                    None
                }
                Err(e) => {
                    tracing::debug!("Could not read body of {}: {}", final_url, e);
                    None
                }
            }
        } else {
            None
        };

        if let Some(title) = body
            .as_ref()
            .and_then(|body| extract_title(&body.bytes, body.charset.as_deref()))
        {
            result.set_title(&title);
        }

        tracing::trace!("Fetched {} -> {} in {}ms", url, status, elapsed);
        FetchOutcome { result, body }
    }

    /// GETs a URL, following redirects, and reads up to `limit` body bytes
    pub async fn fetch_body(&self, url: &Url, limit: usize) -> Result<FetchedBody, FetchFailure> {
        let followed = self
            .send_following(Method::GET, url)
            .await
            .map_err(AttemptError::into_failure)?;

        let status = followed.response.status().as_u16();
        let content_type = header_content_type(&followed.response);
        let charset = content_type.as_deref().and_then(charset_from_content_type);
        let bytes = read_prefix(followed.response, limit)
            .await
            .map_err(|e| FetchFailure::classify(&e))?;

        Ok(FetchedBody {
            final_url: followed.final_url,
            status,
            content_type,
            charset,
            bytes,
        })
    }

    fn failed(url: &Url, err: AttemptError, started: Instant) -> PageResult {
        let failure = err.into_failure();
        tracing::debug!("Fetch of {} failed: {}", url, failure);
        PageResult::failure(url.as_str(), failure.to_string(), Some(elapsed_ms(started)))
    }

    /// Sends one request and follows up to [`MAX_REDIRECTS`] redirects
    async fn send_following(&self, method: Method, url: &Url) -> Result<Followed, AttemptError> {
        let mut current = url.clone();
        let mut chain = vec![url.to_string()];

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .request(method.clone(), current.clone())
                .timeout(self.timeout)
                .send()
                .await
                .map_err(AttemptError::Request)?;

            if response.status().is_redirection() {
                if let Some(next) = redirect_target(&current, &response) {
                    tracing::trace!("{} redirected to {}", current, next);
                    chain.push(next.to_string());
                    current = next;
                    continue;
                }
            }

            if chain.len() == 1 {
                chain.clear();
            }

            return Ok(Followed {
                response,
                final_url: current,
                chain,
            });
        }

        Err(AttemptError::TooManyRedirects(format!(
            "too many redirects (more than {}) starting at {}",
            MAX_REDIRECTS, url
        )))
    }
}
