//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the traversal loop that ties together:
//! - The scheduler (frontier and visited set)
//! - The robots gate
//! - Fetching, politeness pacing and link extraction
//!
//! Everything runs sequentially: one request is in flight at a time.

use crate::config::Config;
use crate::crawler::fetcher::{FetchedBody, Fetcher, CRAWL_BODY_LIMIT};
use crate::crawler::parser::parse_page;
use crate::crawler::scheduler::{Admission, FrontierEntry, Scheduler};
use crate::robots::RobotsGate;
use crate::state::PageResult;
use crate::url::normalize_seed;
use crate::LinkProbeError;
use std::time::Instant;
use url::Url;

/// One crawl run: its configuration plus all traversal state
///
/// The session owns the scheduler, the robots gate and the ordered result
/// sequence. [`CrawlSession::run`] consumes it and hands back the results.
pub struct CrawlSession {
    config: Config,
    fetcher: Fetcher,
    robots: Option<RobotsGate>,
    scheduler: Scheduler,
    results: Vec<PageResult>,
    pages_fetched: usize,
}

impl CrawlSession {
    /// Creates a new session for the given seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The starting URL; a missing scheme defaults to https
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Ready to run
    /// * `Err(LinkProbeError)` - The seed is unusable or the HTTP client could not be built
    pub fn new(seed: &str, config: Config) -> Result<Self, LinkProbeError> {
        let fetcher = Fetcher::new(&config.http)?;
        Self::with_fetcher(seed, config, fetcher)
    }

    /// Creates a session that uses an existing fetcher
    pub fn with_fetcher(seed: &str, config: Config, fetcher: Fetcher) -> Result<Self, LinkProbeError> {
        let seed = normalize_seed(seed)?;

        let robots = config
            .robots
            .respect
            .then(|| RobotsGate::new(&config.http.user_agent));

        let scheduler = Scheduler::new(
            seed,
            config.crawler.same_domain_only,
            config.crawler.visited_cap(),
        );

        Ok(Self {
            config,
            fetcher,
            robots,
            scheduler,
            results: Vec::new(),
            pages_fetched: 0,
        })
    }

    pub fn seed(&self) -> &Url {
        self.scheduler.seed()
    }

    /// Runs the crawl to completion
    ///
    /// The loop stops when the frontier is empty or `max_pages` pages have
    /// been fetched. Robots-blocked pages get a result but are not counted.
    /// Results come back in fetch order.
    pub async fn run(mut self) -> Vec<PageResult> {
        let max_pages = self.config.crawler.max_pages;
        let delay = self.config.crawler.delay();
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl at {} (max depth {}, max pages {})",
            self.scheduler.seed(),
            self.config.crawler.max_depth,
            max_pages
        );

        while self.pages_fetched < max_pages {
            let Some(entry) = self.scheduler.next_entry() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            tracing::debug!("Processing {} (depth {})", entry.url, entry.depth);

            if !self.is_allowed(&entry.url).await {
                tracing::info!("URL {} disallowed by robots.txt", entry.url);
                self.results
                    .push(PageResult::robots_blocked(entry.url.as_str(), entry.depth));
                continue;
            }

            let outcome = self.fetcher.fetch_page(&entry.url, CRAWL_BODY_LIMIT).await;
            let mut result = outcome.result.with_depth(entry.depth);
            self.pages_fetched += 1;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if self.should_expand(&result) {
                self.expand(&entry, &mut result, outcome.body).await;
            }

            self.results.push(result);

            if self.pages_fetched % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {} visited",
                    self.pages_fetched,
                    self.scheduler.frontier_size(),
                    self.scheduler.visited_count()
                );
            }
        }

        if self.pages_fetched >= max_pages && !self.scheduler.is_exhausted() {
            tracing::info!(
                "Page limit of {} reached with {} URLs left in frontier",
                max_pages,
                self.scheduler.frontier_size()
            );
        }

        tracing::info!(
            "Crawl completed: {} pages fetched, {} results, robots.txt loaded for {} origins, in {:?}",
            self.pages_fetched,
            self.results.len(),
            self.robots.as_ref().map_or(0, RobotsGate::origins_loaded),
            start_time.elapsed()
        );

        self.results
    }

    async fn is_allowed(&mut self, url: &Url) -> bool {
        match self.robots.as_mut() {
            Some(gate) => gate.can_fetch(&self.fetcher, url).await,
            None => true,
        }
    }

    /// Only successful HTML pages above the depth limit are mined for links
    fn should_expand(&self, result: &PageResult) -> bool {
        result.ok
            && result.is_success()
            && result.is_html()
            && result.depth < self.config.crawler.max_depth
    }

    /// Extracts links from the page body and queues the admitted ones
    ///
    /// The body read during the check is reused; the page is fetched again
    /// only when none was kept. Failures here are logged and otherwise
    /// ignored since the page result has already been recorded.
    async fn expand(&mut self, entry: &FrontierEntry, result: &mut PageResult, body: Option<FetchedBody>) {
        let body = match body {
            Some(body) => body,
            None => {
                let target = Url::parse(&result.final_url).unwrap_or_else(|_| entry.url.clone());
                match self.fetcher.fetch_body(&target, CRAWL_BODY_LIMIT).await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::debug!("Link extraction fetch of {} failed: {}", target, e);
                        return;
                    }
                }
            }
        };

        let parsed = parse_page(&body.bytes, &body.final_url, body.charset.as_deref());
        if result.title.is_none() {
            if let Some(title) = parsed.title.as_deref() {
                result.set_title(title);
            }
        }

        let next_depth = entry.depth + 1;
        let mut enqueued = 0usize;
        for link in parsed.links {
            if self.scheduler.offer(link, next_depth) == Admission::Enqueued {
                enqueued += 1;
            }
        }

        tracing::debug!(
            "{}: {} links enqueued at depth {}",
            entry.url,
            enqueued,
            next_depth
        );
    }
}

/// Runs a complete crawl operation
///
/// # Example
///
/// ```no_run
/// use linkprobe::config::Config;
/// use linkprobe::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let results = run_crawl("https://example.com/", Config::default()).await?;
/// println!("{} pages checked", results.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(seed: &str, config: Config) -> Result<Vec<PageResult>, LinkProbeError> {
    let session = CrawlSession::new(seed, config)?;
    Ok(session.run().await)
}
