//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with HEAD-then-GET fallback and error classification
//! - HTML parsing and link extraction
//! - Frontier scheduling and the visited set
//! - Overall crawl coordination
//! - Batch checking of URL lists

pub mod batch;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use batch::{check_urls, read_url_list};
pub use coordinator::{run_crawl, CrawlSession};
pub use fetcher::{
    build_http_client, charset_from_content_type, FetchFailure, FetchOutcome, FetchedBody, Fetcher,
    CHECK_BODY_LIMIT, CRAWL_BODY_LIMIT,
};
pub use parser::{decode_body, extract_title, parse_page, ParsedPage};
pub use scheduler::{Admission, FrontierEntry, Scheduler};
