//! HTML parser for extracting links and metadata
//!
//! This module handles parsing bounded HTML bodies to extract:
//! - Links to follow (from `<a href>` tags)
//! - Page title

use crate::url::normalize_link;
use encoding_rs::{Encoding, UTF_8};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from `<title>`), trimmed
    pub title: Option<String>,

    /// Unique absolute links in document order
    pub links: Vec<Url>,
}

/// Decodes a body prefix into text, substituting invalid sequences
///
/// Unknown or missing encodings fall back to UTF-8. A body cut off in the
/// middle of a multi-byte character decodes with a replacement character
/// instead of failing.
pub fn decode_body(bytes: &[u8], encoding: Option<&str>) -> String {
    let encoding = encoding
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Parses an HTML body and extracts links and the title
///
/// # Link Extraction Rules
///
/// **Include:** every `<a href="...">`, resolved against `base_url`
///
/// **Exclude:** hrefs that [`normalize_link`] rejects (`javascript:`,
/// `mailto:`, `tel:`, `sms:`, `data:`, non-HTTP schemes, unresolvable hrefs)
///
/// Fragments are stripped, so `#section` links collapse onto their page.
/// Malformed markup never fails; the worst case is an empty link list.
///
/// # Example
///
/// ```
/// use linkprobe::crawler::parse_page;
/// use url::Url;
///
/// let html = br#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url, None);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_page(bytes: &[u8], base_url: &Url, encoding: Option<&str>) -> ParsedPage {
    let html = decode_body(bytes, encoding);
    let document = Html::parse_document(&html);

    ParsedPage {
        title: title_of(&document),
        links: links_of(&document, base_url),
    }
}

/// Extracts only the title from an HTML body
pub fn extract_title(bytes: &[u8], encoding: Option<&str>) -> Option<String> {
    let html = decode_body(bytes, encoding);
    title_of(&Html::parse_document(&html))
}

fn title_of(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn links_of(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| normalize_link(base_url, href))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
