//! Batch URL-list checking
//!
//! Checks every URL of a CSV column once, without following links. Rows are
//! reported in input order, one `PageResult` each, so the report lines up
//! with the source file.

use crate::crawler::fetcher::{Fetcher, CHECK_BODY_LIMIT};
use crate::state::PageResult;
use crate::url::{extract_host, host_within, normalize_seed};
use crate::LinkProbeError;
use std::path::Path;
use std::time::Duration;

/// Header names recognized as the URL column, compared case-insensitively
const URL_COLUMN_NAMES: &[&str] = &["url", "urls", "link", "links", "website", "site", "homepage"];

pub const SKIPPED_NO_URL: &str = "Skipped: no URL provided";
pub const SKIPPED_DOMAIN: &str = "Skipped: domain not allowed";

/// Picks the column most likely to hold URLs
///
/// Preference order: a well-known header name, then any header containing
/// `url`, then the first column. Returns `None` only for an empty header row.
pub fn detect_url_column(headers: &csv::StringRecord) -> Option<usize> {
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    names
        .iter()
        .position(|name| URL_COLUMN_NAMES.contains(&name.as_str()))
        .or_else(|| names.iter().position(|name| name.contains("url")))
        .or_else(|| (!names.is_empty()).then_some(0))
}

/// Reads the URL column of a CSV file
pub fn read_url_list(path: &Path) -> Result<Vec<String>, LinkProbeError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = detect_url_column(&headers)
        .ok_or_else(|| LinkProbeError::NoUrlColumn(path.display().to_string()))?;

    tracing::info!(
        "Reading URLs from column '{}' of {}",
        headers.get(column).unwrap_or_default(),
        path.display()
    );

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        urls.push(record.get(column).unwrap_or_default().trim().to_string());
    }
    Ok(urls)
}

/// Checks each URL in order
///
/// # Arguments
///
/// * `fetcher` - The fetcher to use
/// * `urls` - Raw URL strings; a missing scheme defaults to https
/// * `allowed_domain` - When set, hosts outside this domain are skipped
/// * `delay` - Pause after every real fetch
pub async fn check_urls(
    fetcher: &Fetcher,
    urls: &[String],
    allowed_domain: Option<&str>,
    delay: Duration,
) -> Vec<PageResult> {
    let mut results = Vec::with_capacity(urls.len());

    for raw in urls {
        let raw = raw.trim();
        if raw.is_empty() {
            results.push(PageResult::failure("", SKIPPED_NO_URL, None));
            continue;
        }

        let url = match normalize_seed(raw) {
            Ok(url) => url,
            Err(e) => {
                results.push(PageResult::failure(raw, format!("Error: invalid URL: {}", e), None));
                continue;
            }
        };

        if let Some(root) = allowed_domain {
            let allowed = extract_host(&url).map_or(false, |host| host_within(root, &host));
            if !allowed {
                tracing::debug!("Skipping {} (outside {})", url, root);
                results.push(PageResult::failure(url.as_str(), SKIPPED_DOMAIN, None));
                continue;
            }
        }

        results.push(fetcher.fetch(&url, CHECK_BODY_LIMIT).await);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::info!("Checked {} URLs", results.len());
    results
}
